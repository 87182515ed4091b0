//! Wire contract between the upload endpoint and the upload client.
//!
//! Request: `POST {base_uri}jobs` with the raw file bytes as body, `X-JOB-FILENAME` naming the
//! file and, to attach to an existing job, `X-JOB-ID`. The client also sends
//! `Content-Type: application/json` even though the body is not JSON; the server ignores it.
//!
//! Response: a JSON object that is either `{"error": "..."}` or
//! `{"jobId": "...", "uploadedFileName": "...", "uri": "..."}`. Readers must look for `error`
//! before anything else.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Path segment of the upload endpoint, relative to the base URI.
pub const JOBS_PATH: &str = "jobs";

/// Header carrying the target file name.
pub const JOB_FILENAME_HEADER: &str = "x-job-filename";

/// Header carrying an existing job ID. Absent or empty means "start a new job".
pub const JOB_ID_HEADER: &str = "x-job-id";

/// Content type the client declares for upload bodies.
pub const DECLARED_CONTENT_TYPE: &str = "application/json";

/// File name the client uses when uploading standard input.
pub const STDIN_FILE_NAME: &str = "tempfile";

/// Successful upload response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Job the file was stored under
    #[schema(example = "AbCd1234")]
    pub job_id: String,
    /// File name exactly as supplied in `X-JOB-FILENAME`
    #[schema(example = "report.txt")]
    pub uploaded_file_name: String,
    /// Retrieval link for the stored file
    #[schema(example = "http://localhost/AbCd1234/input/report.txt")]
    pub uri: String,
}

/// Error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Render a response body as two-space indented JSON.
///
/// Serialising these types cannot realistically fail; if it ever does the failure itself is
/// reported as an error body so callers always get JSON.
pub fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({ "error": e.to_string() }).to_string()
    })
}

/// Failures reading an upload response on the client side.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("server responded with {0}")]
    Server(String),
    #[error("parsing body as json failed")]
    MalformedBody(#[from] serde_json::Error),
    #[error("Upload Error - missing '{field}' in server response {body}")]
    MissingField { field: &'static str, body: String },
}

/// Decode an upload response body.
///
/// The body is read as a loose JSON object so an `error` key wins regardless of what else is
/// present.
///
/// # Errors
///
/// Returns `ProtocolError` if the body is not a JSON object, carries an `error` field, or lacks
/// `uri` or `jobId`.
pub fn parse_upload_response(body: &[u8]) -> Result<UploadReceipt, ProtocolError> {
    let fields: HashMap<String, serde_json::Value> = serde_json::from_slice(body)?;

    if let Some(error) = fields.get("error") {
        let message = match error {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ProtocolError::Server(message));
    }

    let field = |name: &'static str| -> Result<String, ProtocolError> {
        fields
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or_else(|| ProtocolError::MissingField {
                field: name,
                body: String::from_utf8_lossy(body).into_owned(),
            })
    };

    let uri = field("uri")?;
    let job_id = field("jobId")?;
    let uploaded_file_name = fields
        .get("uploadedFileName")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_owned();

    Ok(UploadReceipt {
        job_id,
        uploaded_file_name,
        uri,
    })
}
