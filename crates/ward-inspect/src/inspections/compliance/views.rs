use super::super::domain::{LocationId, User};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyCompliance {
    pub current: f64,
    pub previous: f64,
    /// Signed difference `current - previous` in percentage points.
    pub trend: f64,
    pub critical_issues: usize,
    pub total_inspections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectorRanking {
    pub inspector: User,
    pub avg_score: f64,
    pub report_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRiskEntry {
    pub location_id: LocationId,
    pub avg_score: f64,
    pub report_count: usize,
}

/// One calendar day of the performance series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub label: String,
    /// `None` when no report fell on this day; never conflated with `0`.
    pub avg_score: Option<f64>,
    pub report_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceBand {
    Good,
    Fair,
    Poor,
}

impl ComplianceBand {
    /// Dashboard banding for averages and activity rows.
    pub fn for_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Good
        } else if score >= 70.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Banding for a single report's detail view, which grades stricter
    /// than the dashboard.
    pub fn for_report_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Good
        } else if score >= 75.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}
