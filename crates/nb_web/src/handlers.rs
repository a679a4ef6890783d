use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub const ALIVE_MESSAGE: &str = "Bot funcionando";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub uptime_secs: u64,
}

pub async fn alive() -> &'static str {
    ALIVE_MESSAGE
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(Health {
        status: "ok",
        uptime_secs: state.uptime_secs(),
    })
}
