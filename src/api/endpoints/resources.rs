//! CRUD endpoints shared by every entity collection.
//!
//! Mounted once per entity type: `/api/<entities>` and `/api/<entities>/:id`.
//! Reads and writes are scoped to the caller; another user's id behaves as
//! a missing id.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, Caller};
use crate::db::{self, DatabaseError, Entity};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `GET /api/<entities>`: every entity the caller owns, insertion order.
pub async fn list<E: Entity>(
    State(ctx): State<ApiContext>,
    caller: Caller,
) -> Result<Json<Vec<E>>, ApiError> {
    Ok(Json(db::list::<E>(ctx.storage(), &caller.user_id)?))
}

/// `GET /api/<entities>/:id`
pub async fn detail<E: Entity>(
    State(ctx): State<ApiContext>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<E>, ApiError> {
    db::get_owned::<E>(ctx.storage(), &id, &caller.user_id)?
        .map(Json)
        .ok_or_else(|| DatabaseError::not_found::<E>(&id).into())
}

/// `POST /api/<entities>`: owner is always the caller.
pub async fn create<E: Entity>(
    State(ctx): State<ApiContext>,
    caller: Caller,
    ApiJson(draft): ApiJson<E::Draft>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let entity = db::create::<E>(ctx.storage(), &caller.user_id, draft)?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// `PUT /api/<entities>/:id`: shallow merge of the supplied fields.
pub async fn update<E: Entity>(
    State(ctx): State<ApiContext>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<E::Patch>,
) -> Result<Json<E>, ApiError> {
    let entity = db::update_owned::<E>(ctx.storage(), &id, &caller.user_id, patch)?;
    Ok(Json(entity))
}

/// `DELETE /api/<entities>/:id`
pub async fn remove<E: Entity>(
    State(ctx): State<ApiContext>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !db::delete_owned::<E>(ctx.storage(), &id, &caller.user_id)? {
        return Err(DatabaseError::not_found::<E>(&id).into());
    }
    tracing::info!(table = E::TABLE, %id, "Entity deleted");
    Ok(Json(MessageResponse {
        message: format!("{} deleted", E::LABEL),
    }))
}
