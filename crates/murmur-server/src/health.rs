use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

/// What the health endpoint reports besides liveness
#[derive(Debug, Clone, Serialize)]
pub struct HealthState {
    pub engine: String,
    pub device: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    details: HealthState,
}

/// Health check handler
pub async fn health_handler(State(state): State<Arc<HealthState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        details: HealthState::clone(&state),
    })
}
