//! # API REST
//!
//! HTTP surface of jobstore.
//!
//! Handles:
//! - `POST /jobs` uploads through [`jobstore_core::UploadService`]
//! - static retrieval of stored files from the storage root
//! - JSON error bodies and status mapping
//! - serving over plain HTTP or TLS with graceful shutdown
//!
//! Uses `jobstore-core` for job assignment, storage and the wire types.

#![warn(rust_2018_idioms)]

mod error;
mod routes;
mod server;

pub use error::ApiError;
pub use routes::{router, ApiDoc, AppState, HealthRes};
pub use server::{serve, ServeConfig, TlsFiles};
