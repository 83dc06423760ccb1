//! User registration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::db;
use crate::models::{NewUser, User};

/// `POST /api/users`: the one create route that needs no `user-id` header.
/// The new user owns itself.
pub async fn register(
    State(ctx): State<ApiContext>,
    ApiJson(draft): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = db::create_user(ctx.storage(), draft)?;
    tracing::info!(user_id = %user.meta.id, role = %user.role, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}
