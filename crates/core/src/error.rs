use jobstore_files::FilesError;
use jobstore_id::IdError;
use jobstore_types::TextError;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("job id generation failed: {0}")]
    RandomSource(IdError),
    #[error("invalid job id: {0}")]
    InvalidJobId(IdError),
    #[error("invalid file name: {0}")]
    InvalidFileName(#[from] TextError),
    #[error("no unused job id found after {0} attempts")]
    IdCollision(usize),
    #[error("{0}")]
    Storage(#[from] FilesError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UploadError {
    /// True when the request itself was at fault rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            UploadError::InvalidJobId(_) | UploadError::InvalidFileName(_)
        )
    }
}

pub type UploadResult<T> = std::result::Result<T, UploadError>;
