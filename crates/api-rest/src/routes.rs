use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use jobstore_core::protocol::{render_json, JOB_FILENAME_HEADER, JOB_ID_HEADER};
use jobstore_core::{ErrorBody, UploadReceipt, UploadRequest, UploadService};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};

use crate::ApiError;

/// Application state shared across REST API handlers
#[derive(Clone, Debug)]
pub struct AppState {
    upload_service: UploadService,
}

/// Liveness response.
#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, upload_job),
    components(schemas(HealthRes, UploadReceipt, ErrorBody))
)]
pub struct ApiDoc;

/// Build the REST router.
///
/// - `POST /jobs` stores an upload; any other method on `/jobs` is an error body.
/// - `GET /health` and `GET /api-docs/openapi.json` describe the service.
/// - Everything else is served as static files from the storage root, so the `uri` returned by
///   an upload is directly fetchable.
///
/// The default request body limit is disabled: uploads are buffered whole and size limits are
/// not enforced.
pub fn router(upload_service: UploadService) -> Router {
    let static_files = ServeDir::new(upload_service.storage().root());

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/jobs", post(upload_job).fallback(method_not_allowed))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { upload_service })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "jobstore REST API is alive".into(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    post,
    path = "/jobs",
    request_body(
        content = Vec<u8>,
        description = "Raw file bytes",
        content_type = "application/octet-stream"
    ),
    params(
        ("X-JOB-FILENAME" = String, Header, description = "Name to store the file under"),
        ("X-JOB-ID" = Option<String>, Header, description = "Existing job to attach the file to as output")
    ),
    responses(
        (status = 200, description = "File stored", body = UploadReceipt),
        (status = 400, description = "Invalid file name or job ID, or unreadable body", body = ErrorBody),
        (status = 405, description = "Method other than POST", body = ErrorBody),
        (status = 500, description = "ID generation or storage failure", body = ErrorBody)
    )
)]
/// Store an uploaded file
///
/// Without `X-JOB-ID` a new job is created and the file lands in its `input` directory. With
/// `X-JOB-ID` the file lands in that job's `output` directory. The whole body is read into
/// memory before anything is written.
///
/// # Errors
/// Returns an `{"error": ...}` body if:
/// - the request body cannot be read,
/// - a routing header is not valid UTF-8,
/// - the file name or job ID is rejected,
/// - ID generation fails, or
/// - the file cannot be written.
#[axum::debug_handler]
async fn upload_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body.map_err(ApiError::ReadBody)?;
    let file_name = header_str(&headers, JOB_FILENAME_HEADER)?
        .unwrap_or_default()
        .to_owned();
    let job_id = header_str(&headers, JOB_ID_HEADER)?.map(str::to_owned);

    let service = state.upload_service.clone();
    let receipt = tokio::task::spawn_blocking(move || {
        service.upload(UploadRequest {
            job_id: job_id.as_deref(),
            file_name: &file_name,
            content: &body,
        })
    })
    .await??;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        render_json(&receipt),
    )
        .into_response())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Header value as UTF-8. Absent headers are `None`; non-UTF-8 values are an error.
fn header_str<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|v| std::str::from_utf8(v.as_bytes()).map_err(|_| ApiError::InvalidHeader(name)))
        .transpose()
}
