//! Compliance scoring and aggregation over inspection reports.
//!
//! Everything here is a pure function of a report snapshot and the reference
//! data behind [`FormResolver`]. Missing data never aborts an aggregation: an
//! unresolvable location scores `0`, an empty set averages to `0`, and a day
//! without reports is reported as `None` rather than `0`.

mod calendar;
mod locations;
mod monthly;
mod ranking;
mod series;
pub mod views;

pub use calendar::MonthWindows;
pub use ranking::top_inspector;
pub use series::project_forecast;
pub use views::{
    ComplianceBand, DailyBucket, InspectorRanking, LocationRiskEntry, MonthlyCompliance,
};

use super::domain::{InspectionForm, InspectionReport, LocationId};
use tracing::warn;

/// Reports scoring below this percentage count as critical issues.
pub const CRITICAL_SCORE_THRESHOLD: f64 = 75.0;
/// Locations averaging below this percentage are flagged as low performing.
pub const LOW_PERFORMANCE_THRESHOLD: f64 = 85.0;
pub const LOW_PERFORMANCE_LIMIT: usize = 5;
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
/// Longest daily series the dashboard will build; longer windows are rejected
/// at the edges and clamped here.
pub const MAX_WINDOW_DAYS: u32 = 366;
/// Number of trailing daily buckets that receive a forecast value.
pub const FORECAST_TAIL_DAYS: usize = 7;

/// Lookup capability the aggregator needs from the reference data owner.
pub trait FormResolver {
    fn form_for_location(&self, location_id: &LocationId) -> Option<&InspectionForm>;
}

/// Stateless aggregator borrowing the reference data it scores against.
pub struct ComplianceAggregator<'a, R: ?Sized> {
    resolver: &'a R,
}

impl<'a, R> ComplianceAggregator<'a, R>
where
    R: FormResolver + ?Sized,
{
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Percentage of the form's available points the report achieved.
    pub fn score(&self, report: &InspectionReport) -> f64 {
        let Some(form) = self.resolver.form_for_location(&report.location_id) else {
            warn!(
                report_id = %report.id,
                location_id = %report.location_id,
                "no inspection form resolves for report location; scoring as 0"
            );
            return 0.0;
        };

        let max_total = form.max_total();
        if form.items.is_empty() || max_total == 0 {
            return 0.0;
        }

        100.0 * f64::from(report.achieved_total()) / f64::from(max_total)
    }

    /// Mean score over the given reports, `0` for an empty set.
    pub fn average<'r, I>(&self, reports: I) -> f64
    where
        I: IntoIterator<Item = &'r InspectionReport>,
    {
        let (total, count) = reports
            .into_iter()
            .fold((0.0, 0usize), |(total, count), report| {
                (total + self.score(report), count + 1)
            });

        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    pub fn is_critical(&self, report: &InspectionReport) -> bool {
        self.score(report) < CRITICAL_SCORE_THRESHOLD
    }
}
