//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handling never reads flags or environment variables and never mutates the configuration.

use crate::{UploadError, UploadResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    base_uri: String,
    storage_root: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `base_uri` is normalised to end with `/` so retrieval links can be built by plain
    /// concatenation.
    pub fn new(base_uri: &str, storage_root: PathBuf) -> UploadResult<Self> {
        if base_uri.trim().is_empty() {
            return Err(UploadError::InvalidConfig("base_uri cannot be empty".into()));
        }
        if storage_root.as_os_str().is_empty() {
            return Err(UploadError::InvalidConfig(
                "storage_root cannot be empty".into(),
            ));
        }

        Ok(Self {
            base_uri: normalize_base_uri(base_uri.trim()),
            storage_root,
        })
    }

    /// Externally visible prefix for retrieval links, always ending with `/`.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }
}

/// Ensure a base URI ends with a trailing `/`.
pub fn normalize_base_uri(base_uri: &str) -> String {
    if base_uri.ends_with('/') {
        base_uri.to_owned()
    } else {
        format!("{base_uri}/")
    }
}
