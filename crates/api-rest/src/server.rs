//! Listener setup for the REST API.
//!
//! Plain HTTP by default; TLS when both a certificate and a key are configured. Either way the
//! server stops accepting connections on Ctrl+C / SIGTERM and gives in-flight requests a grace
//! period to finish.

use anyhow::Context;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// PEM certificate chain and private key.
#[derive(Clone, Debug)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Transport configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub addr: SocketAddr,
    pub tls: Option<TlsFiles>,
}

impl ServeConfig {
    /// Listen on all interfaces at `port`. TLS is enabled only if both `cert` and `key` are set.
    pub fn new(port: u16, cert: Option<PathBuf>, key: Option<PathBuf>) -> Self {
        let tls = match (cert, key) {
            (Some(cert), Some(key)) => Some(TlsFiles { cert, key }),
            _ => None,
        };
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            tls,
        }
    }
}

/// Serve `app` until a shutdown signal arrives.
///
/// # Errors
/// Returns an error if:
/// - the TLS certificate or key cannot be loaded,
/// - the address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn serve(app: Router, config: ServeConfig) -> anyhow::Result<()> {
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    match config.tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .with_context(|| {
                    format!(
                        "loading TLS certificate {} / key {} failed",
                        tls.cert.display(),
                        tls.key.display()
                    )
                })?;
            tracing::info!(addr = %config.addr, "serving HTTPS");
            axum_server::bind_rustls(config.addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(addr = %config.addr, "serving HTTP");
            axum_server::bind(config.addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, shutting down server gracefully");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
