//! Constants used throughout the jobstore core crate.

/// Default externally visible prefix for retrieval links.
pub const DEFAULT_BASE_URI: &str = "http://localhost/";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 80;

/// Default storage root when no explicit directory is configured.
pub const DEFAULT_STORAGE_DIR: &str = "./storage/";

/// How many fresh IDs are drawn before giving up on finding one without a directory.
pub const MAX_ID_ATTEMPTS: usize = 5;
