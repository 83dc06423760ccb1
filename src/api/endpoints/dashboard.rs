//! `GET /api/dashboard/stats`

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Caller};
use crate::dashboard::{compute_stats, DashboardStats};

/// Summary for the caller; "today" is the server's local calendar date.
pub async fn stats(
    State(ctx): State<ApiContext>,
    caller: Caller,
) -> Result<Json<DashboardStats>, ApiError> {
    let today = chrono::Local::now().date_naive();
    Ok(Json(compute_stats(ctx.storage(), &caller.user_id, today)?))
}
