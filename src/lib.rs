//! MIDI analysis service
//!
//! A single `POST /` endpoint takes a multipart upload with a `midi_file`
//! field and answers with the file's primary tempo, tempo timeline, duration
//! and instrument count. Parsing is delegated to the `midi-summary` crate.
//!
//! Requests share no state: every upload is read into its own buffer,
//! analyzed and dropped with the response.

pub mod analysis;
pub mod config;
pub mod error;
pub mod routes;

use std::future::Future;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;

pub use analysis::{analyze, AnalysisResult, TempoChanges};
pub use config::ServerConfig;
pub use error::AnalyzeError;

/// Build the application router with the configured upload limit
pub fn router(config: &ServerConfig) -> Router {
    Router::new()
        .route("/", post(routes::analyze_midi))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}

/// Serve requests on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, config: &ServerConfig, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await
}
