//! # jobstore Core
//!
//! Core logic for the jobstore upload service.
//!
//! This crate decides where an upload belongs and writes it there:
//! - Job assignment (new job with a generated ID vs. output for an existing job)
//! - Storage through [`jobstore_files::JobStorage`]
//! - Retrieval URI construction from the configured base URI
//! - The wire types shared by the HTTP server and the upload client
//!
//! **No API concerns**: routing, HTTP status mapping and TLS belong in `api-rest`; the HTTP
//! client belongs in `jobstore-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod upload;

pub use config::{normalize_base_uri, CoreConfig};
pub use constants::DEFAULT_STORAGE_DIR;
pub use error::{UploadError, UploadResult};
pub use jobstore_files::{Direction, FileName, JobId, JobStorage};
pub use protocol::{ErrorBody, ProtocolError, UploadReceipt};
pub use upload::{UploadRequest, UploadService};
