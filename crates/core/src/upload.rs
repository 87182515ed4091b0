//! Upload handling.
//!
//! [`UploadService`] is the transport-independent half of the upload endpoint. Given the raw
//! header values and body it:
//!
//! 1. validates the file name,
//! 2. decides the job and direction (a fresh ID and `input` when no job ID was supplied, the
//!    supplied ID and `output` otherwise),
//! 3. ensures both direction directories exist and writes the body,
//! 4. returns an [`UploadReceipt`] whose `uri` fetches the same bytes back.

use crate::constants::MAX_ID_ATTEMPTS;
use crate::protocol::UploadReceipt;
use crate::{CoreConfig, UploadError, UploadResult};
use jobstore_files::{Direction, FileName, JobId, JobStorage};
use jobstore_id::IdResult;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;
use std::sync::Arc;

/// Characters left as-is when a file name is placed in a retrieval URI.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

type IdSource = Arc<dyn Fn() -> IdResult<JobId> + Send + Sync>;

/// One upload as received from the transport.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    /// Value of `X-JOB-ID`; `None` or empty starts a new job
    pub job_id: Option<&'a str>,
    /// Value of `X-JOB-FILENAME`
    pub file_name: &'a str,
    pub content: &'a [u8],
}

/// Assigns uploads to jobs and stores them.
#[derive(Clone)]
pub struct UploadService {
    cfg: Arc<CoreConfig>,
    storage: JobStorage,
    id_source: IdSource,
}

impl fmt::Debug for UploadService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadService")
            .field("cfg", &self.cfg)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl UploadService {
    /// Creates the service, creating the storage root if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Storage`] if the storage root cannot be created or opened.
    pub fn new(cfg: Arc<CoreConfig>) -> UploadResult<Self> {
        let storage = JobStorage::open(cfg.storage_root())?;
        Ok(Self {
            cfg,
            storage,
            id_source: Arc::new(JobId::generate),
        })
    }

    /// Replaces the job ID generator.
    pub fn with_id_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> IdResult<JobId> + Send + Sync + 'static,
    {
        self.id_source = Arc::new(source);
        self
    }

    pub fn storage(&self) -> &JobStorage {
        &self.storage
    }

    /// Stores one upload and returns its receipt.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` if:
    /// - the file name is empty or not a single path component,
    /// - the supplied job ID is not canonical,
    /// - no job ID could be generated, or
    /// - directory creation or the file write fails.
    pub fn upload(&self, request: UploadRequest<'_>) -> UploadResult<UploadReceipt> {
        let file_name = FileName::new(request.file_name)?;
        let (job_id, direction) = self.assign_job(request.job_id)?;

        self.storage
            .write(&job_id, direction, &file_name, request.content)?;

        tracing::info!(
            job_id = %job_id,
            direction = %direction,
            file_name = %file_name,
            size = request.content.len(),
            "jobFile {:?} uploaded successfully",
            job_id.as_str()
        );

        Ok(UploadReceipt {
            uri: self.retrieval_uri(&job_id, direction, &file_name),
            job_id: job_id.to_string(),
            uploaded_file_name: file_name.to_string(),
        })
    }

    /// Retrieval link: `base_uri + job_id + "/" + direction + "/" + file_name`.
    ///
    /// The file name is percent-encoded as a path segment so the link always resolves to the
    /// stored file; plain names such as `report.txt` are unchanged.
    pub fn retrieval_uri(
        &self,
        job_id: &JobId,
        direction: Direction,
        file_name: &FileName,
    ) -> String {
        format!(
            "{}{}/{}/{}",
            self.cfg.base_uri(),
            job_id,
            direction,
            utf8_percent_encode(file_name.as_str(), PATH_SEGMENT)
        )
    }

    fn assign_job(&self, supplied: Option<&str>) -> UploadResult<(JobId, Direction)> {
        match supplied.filter(|id| !id.is_empty()) {
            Some(id) => {
                let job_id = JobId::parse(id).map_err(UploadError::InvalidJobId)?;
                Ok((job_id, Direction::Output))
            }
            None => Ok((self.allocate_job_id()?, Direction::Input)),
        }
    }

    /// Draws IDs until one has no directory under the storage root yet.
    fn allocate_job_id(&self) -> UploadResult<JobId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = (self.id_source)().map_err(UploadError::RandomSource)?;
            if !self.storage.job_exists(&candidate) {
                return Ok(candidate);
            }
            tracing::warn!(job_id = %candidate, "generated job id already in use, retrying");
        }
        Err(UploadError::IdCollision(MAX_ID_ATTEMPTS))
    }
}
