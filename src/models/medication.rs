use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{merge, nullable, Meta};
use crate::db::{Entity, EntityStore, Storage};

/// A medication on a user's schedule.
///
/// `times` holds the daily schedule as `HH:MM` strings, in the order the
/// user entered them. Dose generation expands one record per entry per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(flatten)]
    pub meta: Meta,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: Option<String>,
    pub times: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub is_running: bool,
}

fn running_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedication {
    pub medicine_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub times: Vec<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default = "running_by_default")]
    pub is_running: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationPatch {
    pub medicine_name: Option<String>,
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub frequency: Option<Option<String>>,
    pub times: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub instructions: Option<Option<String>>,
    pub is_running: Option<bool>,
}

impl Entity for Medication {
    const LABEL: &'static str = "Medication";
    const TABLE: &'static str = "medications";

    type Draft = NewMedication;
    type Patch = MedicationPatch;

    fn from_draft(meta: Meta, draft: NewMedication) -> Self {
        Self {
            meta,
            medicine_name: draft.medicine_name,
            dosage: draft.dosage,
            frequency: draft.frequency,
            times: draft.times,
            start_date: draft.start_date,
            end_date: draft.end_date,
            instructions: draft.instructions,
            is_running: draft.is_running,
        }
    }

    fn apply_patch(&mut self, patch: MedicationPatch) {
        merge(&mut self.medicine_name, patch.medicine_name);
        merge(&mut self.dosage, patch.dosage);
        merge(&mut self.frequency, patch.frequency);
        merge(&mut self.times, patch.times);
        merge(&mut self.start_date, patch.start_date);
        merge(&mut self.end_date, patch.end_date);
        merge(&mut self.instructions, patch.instructions);
        merge(&mut self.is_running, patch.is_running);
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn table(storage: &Storage) -> &dyn EntityStore<Self> {
        storage.medications.as_ref()
    }
}
