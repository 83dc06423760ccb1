//! `GET /api/health-metrics/latest`

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Caller};
use crate::db;
use crate::models::HealthMetrics;

/// Newest snapshot by `recordedAt`; 404 when the caller has none.
pub async fn latest(
    State(ctx): State<ApiContext>,
    caller: Caller,
) -> Result<Json<HealthMetrics>, ApiError> {
    db::latest_metrics(ctx.storage(), &caller.user_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No health metrics recorded".into()))
}
