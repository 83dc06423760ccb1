use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::{ParameterStatus, RiskLevel};
use super::{merge, nullable, Meta};
use crate::db::{Entity, EntityStore, Storage};

/// An uploaded report. `file_url` is produced by the upload collaborator
/// and treated as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    #[serde(flatten)]
    pub meta: Meta,
    pub file_name: String,
    pub file_url: String,
    pub report_type: Option<String>,
    pub analysis: Option<ReportAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAnalysis {
    pub parameters: BTreeMap<String, ParameterReading>,
    #[serde(default)]
    pub summary: AnalysisSummary,
}

impl ReportAnalysis {
    /// Recompute the summary so it always agrees with `parameters`.
    pub fn summarized(mut self) -> Self {
        self.summary = AnalysisSummary::from_parameters(&self.parameters);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterReading {
    pub value: f64,
    pub unit: String,
    pub normal_range: String,
    pub status: ParameterStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_parameters: u32,
    pub normal_count: u32,
    pub abnormal_count: u32,
    pub critical_count: u32,
    pub risk_level: RiskLevel,
}

impl AnalysisSummary {
    /// Summarize a parameter map: counts per status, risk from the worst finding.
    pub fn from_parameters(parameters: &BTreeMap<String, ParameterReading>) -> Self {
        let mut summary = Self {
            total_parameters: parameters.len() as u32,
            normal_count: 0,
            abnormal_count: 0,
            critical_count: 0,
            risk_level: RiskLevel::Low,
        };
        for reading in parameters.values() {
            match reading.status {
                ParameterStatus::Normal => summary.normal_count += 1,
                ParameterStatus::Abnormal => summary.abnormal_count += 1,
                ParameterStatus::Critical => summary.critical_count += 1,
            }
        }
        summary.risk_level = if summary.critical_count > 0 {
            RiskLevel::High
        } else if summary.abnormal_count > 0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        summary
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthReport {
    pub file_name: String,
    pub file_url: String,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(default)]
    pub analysis: Option<ReportAnalysis>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReportPatch {
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub report_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub analysis: Option<Option<ReportAnalysis>>,
}

impl Entity for HealthReport {
    const LABEL: &'static str = "Health report";
    const TABLE: &'static str = "health_reports";

    type Draft = NewHealthReport;
    type Patch = HealthReportPatch;

    fn from_draft(meta: Meta, draft: NewHealthReport) -> Self {
        Self {
            meta,
            file_name: draft.file_name,
            file_url: draft.file_url,
            report_type: draft.report_type,
            analysis: draft.analysis.map(ReportAnalysis::summarized),
        }
    }

    fn apply_patch(&mut self, patch: HealthReportPatch) {
        merge(&mut self.file_name, patch.file_name);
        merge(&mut self.file_url, patch.file_url);
        merge(&mut self.report_type, patch.report_type);
        merge(
            &mut self.analysis,
            patch.analysis.map(|a| a.map(ReportAnalysis::summarized)),
        );
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn table(storage: &Storage) -> &dyn EntityStore<Self> {
        storage.health_reports.as_ref()
    }
}
