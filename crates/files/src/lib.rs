//! jobstore File Storage
//!
//! This crate maps uploads onto the filesystem. A job is a directory under the storage root
//! named after its [`JobId`]; every job has exactly two direction subdirectories:
//!
//! ```text
//! <storage_root>/
//! └── <job_id>/            # 8 alphanumeric characters
//!     ├── input/           # files uploaded without a job ID
//!     │   └── report.txt
//!     └── output/          # files uploaded against an existing job ID
//!         └── result.txt
//! ```
//!
//! Both direction directories are created on the first upload for a job, whichever direction
//! that upload targets. There is no other record of a job: if the directory exists, the job
//! exists.
//!
//! ## Example Usage
//!
//! ```no_run
//! use jobstore_files::{Direction, FileName, JobId, JobStorage};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = JobStorage::open(Path::new("./storage"))?;
//! let job_id = JobId::generate()?;
//! let name = FileName::new("report.txt")?;
//!
//! let stored = storage.write(&job_id, Direction::Input, &name, b"hello")?;
//! println!("wrote {}", stored.path.display());
//! # Ok(())
//! # }
//! ```

mod storage;

pub use jobstore_id::JobId;
pub use jobstore_types::{Direction, FileName};
pub use storage::{JobStorage, StoredFile};

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Storage root could not be created or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Directory creation or file write failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
