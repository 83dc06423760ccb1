use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::DoseStatus;
use super::{merge, nullable, Meta};
use crate::db::{Entity, EntityStore, Storage};

/// One scheduled intake of a medication.
///
/// `medication_id` is not checked against the medications table and
/// survives deletion of the medication it points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseRecord {
    #[serde(flatten)]
    pub meta: Meta,
    pub medication_id: String,
    /// ISO date-time, e.g. `2026-10-16T08:00:00`.
    pub scheduled_time: String,
    pub actual_time: Option<DateTime<Utc>>,
    pub status: DoseStatus,
    pub notes: Option<String>,
}

impl DoseRecord {
    /// Whether the record is scheduled on `date` (prefix match on `scheduled_time`).
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.scheduled_time
            .starts_with(&date.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoseRecord {
    pub medication_id: String,
    pub scheduled_time: String,
    #[serde(default)]
    pub actual_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: DoseStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseRecordPatch {
    pub medication_id: Option<String>,
    pub scheduled_time: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub actual_time: Option<Option<DateTime<Utc>>>,
    pub status: Option<DoseStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl DoseRecordPatch {
    /// Patch that records the outcome of a dose.
    pub fn outcome(status: DoseStatus, actual_time: Option<DateTime<Utc>>) -> Self {
        Self {
            status: Some(status),
            actual_time: Some(actual_time),
            ..Self::default()
        }
    }
}

impl Entity for DoseRecord {
    const LABEL: &'static str = "Dose record";
    const TABLE: &'static str = "dose_records";

    type Draft = NewDoseRecord;
    type Patch = DoseRecordPatch;

    fn from_draft(meta: Meta, draft: NewDoseRecord) -> Self {
        Self {
            meta,
            medication_id: draft.medication_id,
            scheduled_time: draft.scheduled_time,
            actual_time: draft.actual_time,
            status: draft.status,
            notes: draft.notes,
        }
    }

    fn apply_patch(&mut self, patch: DoseRecordPatch) {
        merge(&mut self.medication_id, patch.medication_id);
        merge(&mut self.scheduled_time, patch.scheduled_time);
        merge(&mut self.actual_time, patch.actual_time);
        merge(&mut self.status, patch.status);
        merge(&mut self.notes, patch.notes);
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn table(storage: &Storage) -> &dyn EntityStore<Self> {
        storage.dose_records.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dose_at(scheduled: &str) -> DoseRecord {
        DoseRecord::from_draft(
            Meta::new("u1"),
            NewDoseRecord {
                medication_id: "m1".into(),
                scheduled_time: scheduled.into(),
                actual_time: None,
                status: DoseStatus::Pending,
                notes: None,
            },
        )
    }

    #[test]
    fn scheduled_on_matches_date_prefix() {
        let dose = dose_at("2026-10-16T08:00:00");
        assert!(dose.is_scheduled_on(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()));
        assert!(!dose.is_scheduled_on(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()));
    }

    #[test]
    fn draft_status_defaults_to_pending() {
        let draft: NewDoseRecord = serde_json::from_str(
            r#"{"medicationId":"m1","scheduledTime":"2026-10-16T08:00:00"}"#,
        )
        .unwrap();
        assert_eq!(draft.status, DoseStatus::Pending);
    }

    #[test]
    fn outcome_patch_sets_status_and_time() {
        let mut dose = dose_at("2026-10-16T08:00:00");
        let now = Utc::now();
        dose.apply_patch(DoseRecordPatch::outcome(DoseStatus::Taken, Some(now)));
        assert_eq!(dose.status, DoseStatus::Taken);
        assert_eq!(dose.actual_time, Some(now));

        dose.apply_patch(DoseRecordPatch::outcome(DoseStatus::Skipped, None));
        assert_eq!(dose.status, DoseStatus::Skipped);
        assert_eq!(dose.actual_time, None);
    }
}
