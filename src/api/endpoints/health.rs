//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub storage: &'static str,
    pub uptime_seconds: i64,
}

/// `GET /api/health`: liveness check, no caller identity needed.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: crate::config::APP_VERSION,
        storage: ctx.storage().backend(),
        uptime_seconds: ctx.core.uptime_secs(),
    })
}
