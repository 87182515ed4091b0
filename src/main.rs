use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{ServeConfig, router, serve};
use jobstore_core::constants::{DEFAULT_BASE_URI, DEFAULT_PORT, DEFAULT_STORAGE_DIR};
use jobstore_core::{CoreConfig, UploadService};

/// Command-line and environment configuration for the jobstore server
#[derive(Parser, Debug)]
#[command(name = "jobstore-run")]
#[command(about = "Job-scoped file upload and retrieval server")]
struct ServerArgs {
    /// Externally visible prefix used to build retrieval links
    #[arg(short = 'b', long, env = "JOBSTORE_BASE_URI", default_value = DEFAULT_BASE_URI)]
    base_uri: String,
    /// Port to listen on
    #[arg(short = 'p', long, env = "JOBSTORE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Directory holding the job tree
    #[arg(short = 's', long, env = "JOBSTORE_STORAGE_DIR", default_value = DEFAULT_STORAGE_DIR)]
    storage: PathBuf,
    /// PEM certificate chain; TLS is enabled when both this and --key are set
    #[arg(long, env = "JOBSTORE_TLS_CERT")]
    cert: Option<PathBuf>,
    /// PEM private key
    #[arg(long, env = "JOBSTORE_TLS_KEY")]
    key: Option<PathBuf>,
}

/// Main entry point for the jobstore server
///
/// Serves `POST /jobs` for uploads and the storage tree for retrieval, over HTTP or, when a
/// certificate and key are configured, HTTPS.
///
/// # Environment Variables
/// - `JOBSTORE_BASE_URI`: prefix for retrieval links (default: "http://localhost/")
/// - `JOBSTORE_PORT`: listening port (default: 80)
/// - `JOBSTORE_STORAGE_DIR`: storage root (default: "./storage/")
/// - `JOBSTORE_TLS_CERT` / `JOBSTORE_TLS_KEY`: PEM files enabling TLS
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jobstore_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("jobstore_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = ServerArgs::parse();

    let cfg = Arc::new(CoreConfig::new(&args.base_uri, args.storage)?);
    let upload_service = UploadService::new(cfg.clone())?;

    tracing::info!(
        "++ Starting server on port {} with baseuri {}",
        args.port,
        cfg.base_uri()
    );
    tracing::info!("++ Storing jobs under {}", upload_service.storage().root().display());

    serve(
        router(upload_service),
        ServeConfig::new(args.port, args.cert, args.key),
    )
    .await
}
