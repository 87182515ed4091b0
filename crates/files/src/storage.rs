//! Job-scoped storage layout.
//!
//! [`JobStorage`] owns the storage root and turns a `(job id, direction, file name)` triple into
//! a path beneath it. Each component of the triple is a validated type, so the resulting path is
//! always exactly three levels below the root.
//!
//! # Write semantics
//!
//! - Directories are created on demand with default permissions; pre-existing ones are fine.
//! - Writing the same triple twice overwrites the first file. There is no versioning.
//! - Writes go straight to the final path. A failure part-way through leaves whatever the
//!   filesystem already flushed.
//! - Concurrent writes to the same triple race and the last writer wins.

use crate::{Direction, FileName, FilesError, JobId};
use std::fs;
use std::path::{Path, PathBuf};

/// A file that has been written to storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub job_id: JobId,
    pub direction: Direction,
    pub file_name: FileName,
    /// Absolute path of the written file
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Filesystem layout for jobs under a single storage root.
#[derive(Debug, Clone)]
pub struct JobStorage {
    /// Canonicalised storage root
    root: PathBuf,
}

impl JobStorage {
    /// Opens the storage root, creating it (and any parents) if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the directory cannot be created,
    /// - the path exists but is not a directory, or
    /// - path canonicalisation fails.
    pub fn open(root: &Path) -> Result<Self, FilesError> {
        fs::create_dir_all(root).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        if !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        let root = root.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self { root })
    }

    /// Returns the canonicalised storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `<root>/<job_id>`.
    #[must_use]
    pub fn job_dir(&self, job_id: &JobId) -> PathBuf {
        self.root.join(job_id.as_str())
    }

    /// Returns `<root>/<job_id>/<direction>`.
    #[must_use]
    pub fn direction_dir(&self, job_id: &JobId, direction: Direction) -> PathBuf {
        self.job_dir(job_id).join(direction.as_str())
    }

    /// Returns `<root>/<job_id>/<direction>/<file_name>`.
    ///
    /// Pure path construction; nothing is created.
    #[must_use]
    pub fn resolve_path(
        &self,
        job_id: &JobId,
        direction: Direction,
        file_name: &FileName,
    ) -> PathBuf {
        self.direction_dir(job_id, direction).join(file_name.as_str())
    }

    /// Returns true if a directory for `job_id` already exists under the root.
    #[must_use]
    pub fn job_exists(&self, job_id: &JobId) -> bool {
        self.job_dir(job_id).is_dir()
    }

    /// Creates both the `input` and `output` directories for a job.
    ///
    /// Idempotent: directories that already exist are left alone. The call only succeeds if
    /// both directories exist afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Io`] naming the directory that could not be created.
    pub fn ensure_job_directories(&self, job_id: &JobId) -> Result<(), FilesError> {
        for direction in Direction::ALL {
            let dir = self.direction_dir(job_id, direction);
            fs::create_dir_all(&dir).map_err(|e| {
                FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create job directory {}: {}", dir.display(), e),
                ))
            })?;
        }
        Ok(())
    }

    /// Writes `content` to `<root>/<job_id>/<direction>/<file_name>`.
    ///
    /// Both direction directories are ensured first. An existing file at the same path is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Io`] if directory creation or the write fails.
    pub fn write(
        &self,
        job_id: &JobId,
        direction: Direction,
        file_name: &FileName,
        content: &[u8],
    ) -> Result<StoredFile, FilesError> {
        self.ensure_job_directories(job_id)?;

        let path = self.resolve_path(job_id, direction, file_name);
        fs::write(&path, content).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("writing file to {} failed: {}", path.display(), e),
            ))
        })?;

        tracing::debug!(path = %path.display(), size = content.len(), "stored job file");

        Ok(StoredFile {
            job_id: job_id.clone(),
            direction,
            file_name: file_name.clone(),
            path,
            size_bytes: content.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, JobStorage) {
        let temp = TempDir::new().unwrap();
        let storage = JobStorage::open(&temp.path().join("storage")).unwrap();
        (temp, storage)
    }

    fn job(id: &str) -> JobId {
        JobId::parse(id).unwrap()
    }

    fn name(n: &str) -> FileName {
        FileName::new(n).unwrap()
    }

    #[test]
    fn test_open_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("storage");
        assert!(!root.exists());

        let storage = JobStorage::open(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(storage.root(), root.canonicalize().unwrap());
    }

    #[test]
    fn test_open_existing_root() {
        let temp = TempDir::new().unwrap();
        let storage = JobStorage::open(temp.path()).unwrap();
        assert_eq!(storage.root(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_open_rejects_file_as_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "not a directory").unwrap();

        let result = JobStorage::open(&file);

        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_resolve_path_layout() {
        let (_temp, storage) = storage();
        let path = storage.resolve_path(&job("AbCd1234"), Direction::Input, &name("report.txt"));

        assert_eq!(
            path,
            storage.root().join("AbCd1234").join("input").join("report.txt")
        );
        assert!(!path.exists());
    }

    #[test]
    fn test_ensure_job_directories_creates_both() {
        let (_temp, storage) = storage();
        let id = job("AbCd1234");
        assert!(!storage.job_exists(&id));

        storage.ensure_job_directories(&id).unwrap();

        assert!(storage.job_exists(&id));
        assert!(storage.direction_dir(&id, Direction::Input).is_dir());
        assert!(storage.direction_dir(&id, Direction::Output).is_dir());
    }

    #[test]
    fn test_ensure_job_directories_is_idempotent() {
        let (_temp, storage) = storage();
        let id = job("AbCd1234");

        storage.ensure_job_directories(&id).unwrap();
        fs::write(storage.direction_dir(&id, Direction::Input).join("keep"), "x").unwrap();
        storage.ensure_job_directories(&id).unwrap();

        assert!(storage
            .direction_dir(&id, Direction::Input)
            .join("keep")
            .is_file());
    }

    #[test]
    fn test_ensure_job_directories_fails_when_blocked() {
        let (_temp, storage) = storage();
        let id = job("AbCd1234");
        // A plain file where the job directory should be.
        fs::write(storage.job_dir(&id), "blocker").unwrap();

        let result = storage.ensure_job_directories(&id);

        match result {
            Err(FilesError::Io(e)) => assert!(e.to_string().contains("AbCd1234")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_write_input_creates_output_dir_too() {
        let (_temp, storage) = storage();
        let id = job("AbCd1234");

        let stored = storage
            .write(&id, Direction::Input, &name("report.txt"), b"hello")
            .unwrap();

        assert_eq!(fs::read(&stored.path).unwrap(), b"hello");
        assert_eq!(stored.size_bytes, 5);
        assert_eq!(stored.direction, Direction::Input);
        assert!(storage.direction_dir(&id, Direction::Output).is_dir());
    }

    #[test]
    fn test_write_output_creates_input_dir_too() {
        let (_temp, storage) = storage();
        let id = job("AbCd1234");

        let stored = storage
            .write(&id, Direction::Output, &name("result.txt"), b"done")
            .unwrap();

        assert!(stored.path.ends_with("AbCd1234/output/result.txt"));
        assert!(storage.direction_dir(&id, Direction::Input).is_dir());
    }

    #[test]
    fn test_write_overwrites_same_triple() {
        let (_temp, storage) = storage();
        let id = job("AbCd1234");
        let file = name("report.txt");

        storage
            .write(&id, Direction::Input, &file, b"first payload")
            .unwrap();
        let stored = storage.write(&id, Direction::Input, &file, b"second").unwrap();

        assert_eq!(fs::read(&stored.path).unwrap(), b"second");
    }

    #[test]
    fn test_write_binary_and_empty_content() {
        let (_temp, storage) = storage();
        let id = job("Bin00001");
        let bytes: Vec<u8> = (0..=255).collect();

        let binary = storage
            .write(&id, Direction::Input, &name("blob.bin"), &bytes)
            .unwrap();
        let empty = storage
            .write(&id, Direction::Input, &name("empty"), b"")
            .unwrap();

        assert_eq!(fs::read(binary.path).unwrap(), bytes);
        assert_eq!(empty.size_bytes, 0);
        assert!(empty.path.is_file());
    }

    #[test]
    fn test_jobs_are_isolated() {
        let (_temp, storage) = storage();
        let a = job("JobAAAAA");
        let b = job("JobBBBBB");
        let file = name("same.txt");

        storage.write(&a, Direction::Input, &file, b"a").unwrap();
        storage.write(&b, Direction::Input, &file, b"b").unwrap();

        assert_eq!(
            fs::read(storage.resolve_path(&a, Direction::Input, &file)).unwrap(),
            b"a"
        );
        assert_eq!(
            fs::read(storage.resolve_path(&b, Direction::Input, &file)).unwrap(),
            b"b"
        );
    }

    #[test]
    fn test_stored_file_serializes_camel_case() {
        let (_temp, storage) = storage();
        let stored = storage
            .write(&job("AbCd1234"), Direction::Output, &name("result.txt"), b"done")
            .unwrap();

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["jobId"], "AbCd1234");
        assert_eq!(json["direction"], "output");
        assert_eq!(json["fileName"], "result.txt");
        assert_eq!(json["sizeBytes"], 4);
    }
}
