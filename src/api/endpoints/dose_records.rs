//! Dose record endpoints beyond plain CRUD:
//! - `GET /api/dose-records?date=YYYY-MM-DD&status=...` filtered list
//! - `POST /api/dose-records/generate` schedule expansion
//! - `POST /api/dose-records/:id/take` and `/skip`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, Caller};
use crate::db;
use crate::doses::{self, GenerateDosesRequest};
use crate::models::enums::DoseStatus;
use crate::models::DoseRecord;

#[derive(Debug, Default, Deserialize)]
pub struct DoseListQuery {
    pub date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub count: usize,
    pub records: Vec<DoseRecord>,
}

/// `GET /api/dose-records`: all of the caller's doses, or one day's.
pub async fn list(
    State(ctx): State<ApiContext>,
    caller: Caller,
    Query(query): Query<DoseListQuery>,
) -> Result<Json<Vec<DoseRecord>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<DoseStatus>)
        .transpose()?;

    let records = match query.date.as_deref() {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ApiError::BadRequest(format!("Invalid date '{raw}', expected YYYY-MM-DD"))
            })?;
            db::list_doses_by_date(ctx.storage(), &caller.user_id, date)?
        }
        None => db::list::<DoseRecord>(ctx.storage(), &caller.user_id)?,
    };

    Ok(Json(match status {
        Some(status) => records.into_iter().filter(|d| d.status == status).collect(),
        None => records,
    }))
}

/// `POST /api/dose-records/generate`
pub async fn generate(
    State(ctx): State<ApiContext>,
    caller: Caller,
    ApiJson(request): ApiJson<GenerateDosesRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>), ApiError> {
    let records = doses::generate_doses(ctx.storage(), &caller.user_id, request)?;
    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            count: records.len(),
            records,
        }),
    ))
}

/// `POST /api/dose-records/:id/take`: status taken, `actualTime` now.
pub async fn take(
    State(ctx): State<ApiContext>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<DoseRecord>, ApiError> {
    let record = db::record_dose_outcome(ctx.storage(), &id, &caller.user_id, DoseStatus::Taken)?;
    Ok(Json(record))
}

/// `POST /api/dose-records/:id/skip`: status skipped, `actualTime` cleared.
pub async fn skip(
    State(ctx): State<ApiContext>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<DoseRecord>, ApiError> {
    let record =
        db::record_dose_outcome(ctx.storage(), &id, &caller.user_id, DoseStatus::Skipped)?;
    Ok(Json(record))
}
