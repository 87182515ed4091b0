//! Upload client for jobstore.
//!
//! Posts a local file or standard input to `{base_uri}jobs` and decodes the receipt. The binary
//! in `main.rs` is a thin wrapper; everything here is usable from tests and other tools.

use jobstore_core::protocol::{
    parse_upload_response, DECLARED_CONTENT_TYPE, JOBS_PATH, JOB_FILENAME_HEADER, JOB_ID_HEADER,
    STDIN_FILE_NAME,
};
use jobstore_core::{ProtocolError, UploadReceipt};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Characters left as-is by [`query_escape`].
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to create HTTP client")]
    Build(#[source] reqwest::Error),
    #[error("No such file or directory: {0:?}")]
    NotFound(PathBuf),
    #[error("reading from {what} failed")]
    Read {
        what: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("reading response body failed")]
    ResponseBody(#[source] reqwest::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Render an error and its causes as a single line, outermost first.
pub fn diagnostic(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

/// Message printed after a successful upload.
pub fn success_message(receipt: &UploadReceipt) -> String {
    format!(
        "Your File has been uploaded successfully \n[JobId]: {}\n[URL]: {}\n",
        receipt.job_id, receipt.uri
    )
}

/// Where the upload content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// A file when a path was given, standard input otherwise.
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        path.map_or(Source::Stdin, Source::File)
    }

    /// Name sent in `X-JOB-FILENAME`: `tempfile` for standard input, the query-escaped path
    /// otherwise.
    pub fn file_name(&self) -> String {
        match self {
            Source::Stdin => STDIN_FILE_NAME.to_owned(),
            Source::File(path) => query_escape(&path.to_string_lossy()),
        }
    }

    /// Read the whole content into memory.
    ///
    /// # Errors
    /// Returns [`ClientError::NotFound`] for a missing file and [`ClientError::Read`] for any
    /// other read failure.
    pub fn read(&self) -> Result<Vec<u8>, ClientError> {
        match self {
            Source::Stdin => read_all(std::io::stdin().lock(), "stdin"),
            Source::File(path) => read_file(path),
        }
    }
}

fn read_all(mut reader: impl Read, what: &str) -> Result<Vec<u8>, ClientError> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(|source| ClientError::Read {
            what: what.to_owned(),
            source,
        })?;
    Ok(content)
}

fn read_file(path: &Path) -> Result<Vec<u8>, ClientError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ClientError::NotFound(path.to_path_buf())
        } else {
            ClientError::Read {
                what: format!("file {:?}", path.display().to_string()),
                source,
            }
        }
    })
}

/// Normalise a server base URI: ensure a trailing `/`, then an `http://` scheme if none is
/// present.
pub fn normalize_base_uri(base_uri: &str) -> String {
    let with_slash = jobstore_core::normalize_base_uri(base_uri.trim());
    if with_slash.starts_with("http") {
        with_slash
    } else {
        format!("http://{with_slash}")
    }
}

/// Escape a string for use as a URL query component: unreserved characters are kept, spaces
/// become `+`, everything else is percent-encoded.
pub fn query_escape(input: &str) -> String {
    input
        .split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// HTTP client for the upload endpoint.
#[derive(Clone, Debug)]
pub struct UploadClient {
    client: Client,
    base_uri: String,
}

impl UploadClient {
    /// # Errors
    /// Returns [`ClientError::Build`] if the HTTP client cannot be created.
    pub fn new(base_uri: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_uri: normalize_base_uri(base_uri),
        })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn jobs_url(&self) -> String {
        format!("{}{}", self.base_uri, JOBS_PATH)
    }

    /// Upload `content` as `file_name`, attaching it to `job_id` if given.
    ///
    /// The response body is decoded whatever the HTTP status; an `error` field in it is
    /// reported as [`ProtocolError::Server`].
    ///
    /// # Errors
    /// Returns `ClientError` if the request fails, the body cannot be read, or the body is not a
    /// successful upload response.
    pub async fn upload(
        &self,
        content: Vec<u8>,
        file_name: &str,
        job_id: Option<&str>,
    ) -> Result<UploadReceipt, ClientError> {
        let url = self.jobs_url();
        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, DECLARED_CONTENT_TYPE)
            .header(JOB_FILENAME_HEADER, file_name)
            .body(content);
        if let Some(id) = job_id.filter(|id| !id.is_empty()) {
            request = request.header(JOB_ID_HEADER, id);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;
        tracing::debug!(status = %response.status(), "upload response received");

        let body = response.bytes().await.map_err(ClientError::ResponseBody)?;
        Ok(parse_upload_response(&body)?)
    }
}
