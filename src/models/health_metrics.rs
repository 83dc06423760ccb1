use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, nullable, Meta};
use crate::db::{Entity, EntityStore, Storage};

/// Timestamped snapshot of vital readings. Every reading is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    #[serde(flatten)]
    pub meta: Meta,
    pub blood_pressure_systolic: Option<u32>,
    pub blood_pressure_diastolic: Option<u32>,
    pub blood_sugar: Option<f64>,
    pub cholesterol: Option<f64>,
    pub bmi: Option<f64>,
    /// kg
    pub weight: Option<f64>,
    /// cm
    pub height: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthMetrics {
    pub blood_pressure_systolic: Option<u32>,
    pub blood_pressure_diastolic: Option<u32>,
    pub blood_sugar: Option<f64>,
    pub cholesterol: Option<f64>,
    pub bmi: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetricsPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub blood_pressure_systolic: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub blood_pressure_diastolic: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub blood_sugar: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub cholesterol: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub bmi: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub weight: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub height: Option<Option<f64>>,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Body-mass index from weight (kg) and height (cm), one decimal.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let meters = height_cm / 100.0;
    Some((weight_kg / (meters * meters) * 10.0).round() / 10.0)
}

impl Entity for HealthMetrics {
    const LABEL: &'static str = "Health metrics";
    const TABLE: &'static str = "health_metrics";

    type Draft = NewHealthMetrics;
    type Patch = HealthMetricsPatch;

    fn from_draft(meta: Meta, draft: NewHealthMetrics) -> Self {
        let recorded_at = draft.recorded_at.unwrap_or(meta.created_at);
        // Derive BMI when the client sent weight and height but no BMI.
        let bmi = draft.bmi.or_else(|| match (draft.weight, draft.height) {
            (Some(w), Some(h)) => compute_bmi(w, h),
            _ => None,
        });
        Self {
            meta,
            blood_pressure_systolic: draft.blood_pressure_systolic,
            blood_pressure_diastolic: draft.blood_pressure_diastolic,
            blood_sugar: draft.blood_sugar,
            cholesterol: draft.cholesterol,
            bmi,
            weight: draft.weight,
            height: draft.height,
            recorded_at,
        }
    }

    fn apply_patch(&mut self, patch: HealthMetricsPatch) {
        merge(&mut self.blood_pressure_systolic, patch.blood_pressure_systolic);
        merge(&mut self.blood_pressure_diastolic, patch.blood_pressure_diastolic);
        merge(&mut self.blood_sugar, patch.blood_sugar);
        merge(&mut self.cholesterol, patch.cholesterol);
        let body_changed = patch.weight.is_some() || patch.height.is_some();
        merge(&mut self.weight, patch.weight);
        merge(&mut self.height, patch.height);
        match patch.bmi {
            Some(bmi) => self.bmi = bmi,
            // Re-derive so BMI never disagrees with the new weight or height.
            None if body_changed => {
                self.bmi = match (self.weight, self.height) {
                    (Some(w), Some(h)) => compute_bmi(w, h),
                    _ => None,
                };
            }
            None => {}
        }
        merge(&mut self.recorded_at, patch.recorded_at);
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn table(storage: &Storage) -> &dyn EntityStore<Self> {
        storage.health_metrics.as_ref()
    }
}
