//! Web front end: one page and an upload endpoint.

mod handlers;
mod page;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::upload::MAX_UPLOAD_BYTES;

pub use handlers::{AppState, DescribeResponse};

/// Multipart framing on top of the image itself.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server running on http://{}", addr);
    if !state.has_stored_token() {
        tracing::warn!("No API token in the environment; users must enter one on the page");
    }

    axum::serve(listener, router(state)).await?;
    Ok(())
}
