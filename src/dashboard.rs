//! Dashboard aggregate: folds a caller's medications, today's doses,
//! reports and latest metrics into one summary. Recomputed on every call.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{self, DatabaseError, Storage};
use crate::models::enums::DoseStatus;
use crate::models::{HealthMetrics, HealthReport, Medication};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_medications: usize,
    /// Dose records scheduled today.
    pub total_doses: usize,
    pub taken_doses: usize,
    pub pending_doses: usize,
    pub skipped_doses: usize,
    /// Percentage of today's doses taken; 0 when nothing is scheduled.
    pub adherence_rate: f64,
    pub total_reports: usize,
    pub latest_metrics: Option<HealthMetrics>,
}

pub fn adherence_rate(taken: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    taken as f64 / total as f64 * 100.0
}

/// Summary for `user_id` with `today` as the calendar date for dose counts.
pub fn compute_stats(
    storage: &Storage,
    user_id: &str,
    today: NaiveDate,
) -> Result<DashboardStats, DatabaseError> {
    let active_medications = db::list::<Medication>(storage, user_id)?
        .iter()
        .filter(|m| m.is_running)
        .count();

    let today_doses = db::list_doses_by_date(storage, user_id, today)?;
    let count = |status: DoseStatus| today_doses.iter().filter(|d| d.status == status).count();
    let taken_doses = count(DoseStatus::Taken);

    Ok(DashboardStats {
        active_medications,
        total_doses: today_doses.len(),
        taken_doses,
        pending_doses: count(DoseStatus::Pending),
        skipped_doses: count(DoseStatus::Skipped),
        adherence_rate: adherence_rate(taken_doses, today_doses.len()),
        total_reports: db::list::<HealthReport>(storage, user_id)?.len(),
        latest_metrics: db::latest_metrics(storage, user_id)?,
    })
}
