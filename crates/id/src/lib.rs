//! Job identifier utilities.
//!
//! Every upload belongs to a *job*, and a job is nothing more than a directory under the storage
//! root named after its identifier. This crate owns the identifier format.
//!
//! ## Canonical form
//! - Length: 8
//! - Characters: `A-Z`, `a-z` and `0-9` (62 symbols)
//! - Example: `AbCd1234`
//!
//! Identifiers are drawn from the operating system's secure random source using rejection
//! sampling, so every symbol of the alphabet is equally likely. Uniqueness is not guaranteed by
//! the generator itself; with 62^8 (about 2.2 × 10^14) possible values a collision is negligible
//! for the expected load, and callers that care can check the storage root.
//!
//! Externally supplied identifiers (the `X-JOB-ID` header) must already be canonical. Use
//! [`JobId::parse`] to validate them before they are turned into filesystem paths.

mod service;

pub use service::{JobId, ALPHABET, JOB_ID_LENGTH};

/// Error type for job identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The secure random source could not be read
    #[error("random source unavailable: {0}")]
    RandomSource(#[from] rand::Error),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for job identifier operations.
pub type IdResult<T> = Result<T, IdError>;
