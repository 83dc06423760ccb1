//! Dose schedule expansion.
//!
//! Walks an inclusive date range and creates one pending dose record per
//! day per time-of-day on the medication's schedule.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::db::{self, DatabaseError, Storage};
use crate::models::enums::DoseStatus;
use crate::models::{DoseRecord, Medication, NewDoseRecord};

/// Longest range a single generation request may cover, in days.
pub const MAX_GENERATION_DAYS: i64 = 366;

#[derive(Debug, thiserror::Error)]
pub enum DoseScheduleError {
    #[error("Medication not found")]
    MedicationNotFound,
    #[error("endDate {end} is before startDate {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("Date range spans {days} days, the limit is {MAX_GENERATION_DAYS}")]
    RangeTooLong { days: i64 },
    #[error("Invalid schedule time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDosesRequest {
    pub medication_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Parse `HH:MM` (one-digit hours accepted) and normalize to two digits.
fn normalize_time(raw: &str) -> Result<String, DoseScheduleError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| DoseScheduleError::InvalidTime(raw.to_string()))
}

/// Drafts for every (day, time) pair in `[start, end]`, day-major, schedule order.
pub fn plan_doses(
    medication: &Medication,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NewDoseRecord>, DoseScheduleError> {
    if end < start {
        return Err(DoseScheduleError::InvertedRange { start, end });
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_GENERATION_DAYS {
        return Err(DoseScheduleError::RangeTooLong { days });
    }

    let times = medication
        .times
        .iter()
        .map(|t| normalize_time(t))
        .collect::<Result<Vec<_>, _>>()?;

    let mut drafts = Vec::with_capacity(days as usize * times.len());
    for day in start.iter_days().take(days as usize) {
        let date = day.format("%Y-%m-%d");
        for time in &times {
            drafts.push(NewDoseRecord {
                medication_id: medication.meta.id.clone(),
                scheduled_time: format!("{date}T{time}:00"),
                actual_time: None,
                status: DoseStatus::Pending,
                notes: None,
            });
        }
    }
    Ok(drafts)
}

/// Expand the caller's medication into stored dose records.
///
/// The medication must exist and belong to `user_id`.
pub fn generate_doses(
    storage: &Storage,
    user_id: &str,
    request: GenerateDosesRequest,
) -> Result<Vec<DoseRecord>, DoseScheduleError> {
    let medication = db::get_owned::<Medication>(storage, &request.medication_id, user_id)?
        .ok_or(DoseScheduleError::MedicationNotFound)?;

    let drafts = plan_doses(&medication, request.start_date, request.end_date)?;
    let mut created = Vec::with_capacity(drafts.len());
    for draft in drafts {
        created.push(db::create::<DoseRecord>(storage, user_id, draft)?);
    }

    tracing::info!(
        medication_id = %medication.meta.id,
        count = created.len(),
        start = %request.start_date,
        end = %request.end_date,
        "Dose records generated"
    );
    Ok(created)
}
