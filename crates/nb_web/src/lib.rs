//! Keep-alive responder so the hosting platform sees the bot as a live web
//! service.

use axum::{routing::get, Router};
use nb_core::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub const DEFAULT_PORT: u16 = 10000;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::alive))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serve the keep-alive routes on `0.0.0.0:port` until the task is dropped.
pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Keep-alive server listening on {}", addr);
    axum::serve(listener, create_app(AppState::new()))
        .await
        .map_err(Error::Io)
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState, DEFAULT_PORT};
    pub use nb_core::{Error, Result};
}
