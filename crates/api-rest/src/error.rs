use axum::extract::rejection::BytesRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use jobstore_core::protocol::render_json;
use jobstore_core::{ErrorBody, UploadError};

/// Request-level failures of the REST API.
///
/// Every variant renders as `{"error": "..."}`. The status code is set as well, but the JSON
/// field is the contract clients rely on.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not a valid endpoint")]
    MethodNotAllowed,
    #[error("reading from body failed: {0}")]
    ReadBody(BytesRejection),
    #[error("header {0} is not valid UTF-8")]
    InvalidHeader(&'static str),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("upload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ReadBody(e) => e.status(),
            ApiError::InvalidHeader(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Upload(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("writing error: {}", self);
        } else {
            tracing::warn!("writing error: {}", self);
        }

        let body = render_json(&ErrorBody {
            error: self.to_string(),
        });
        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
