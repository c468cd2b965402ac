use super::catalog::ReferenceCatalog;
use super::compliance::{
    top_inspector, ComplianceAggregator, ComplianceBand, DailyBucket, InspectorRanking,
    LocationRiskEntry, DEFAULT_WINDOW_DAYS, LOW_PERFORMANCE_LIMIT, LOW_PERFORMANCE_THRESHOLD,
};
use super::domain::{InspectionReport, LocationId, ReportId, ReportStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

/// Tunables for the manager dashboard; defaults mirror the compliance policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardOptions {
    pub window_days: u32,
    pub low_performance_threshold: f64,
    pub low_performance_limit: usize,
    pub activity_limit: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            low_performance_threshold: LOW_PERFORMANCE_THRESHOLD,
            low_performance_limit: LOW_PERFORMANCE_LIMIT,
            activity_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LowPerformingArea {
    pub location_id: LocationId,
    pub location_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    pub avg_score: f64,
    pub report_count: usize,
    pub band: ComplianceBand,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub report_id: ReportId,
    pub reference_number: String,
    pub inspector_name: String,
    pub location_name: String,
    pub date: DateTime<Utc>,
    pub status: ReportStatus,
    pub score: f64,
    pub critical: bool,
    pub band: ComplianceBand,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerDashboard {
    pub reference_date: NaiveDate,
    pub overall_compliance: f64,
    pub previous_compliance: f64,
    pub compliance_trend: f64,
    pub total_inspections: usize,
    pub critical_issues: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_inspector: Option<InspectorRanking>,
    pub inspector_ranking: Vec<InspectorRanking>,
    pub low_performing_areas: Vec<LowPerformingArea>,
    pub insights: Vec<String>,
    pub performance: Vec<DailyBucket>,
    pub activity: Vec<ActivityEntry>,
}

pub fn build_dashboard<G>(
    catalog: &ReferenceCatalog,
    reports: &[InspectionReport],
    reference: NaiveDate,
    options: &DashboardOptions,
    rng: &mut G,
) -> ManagerDashboard
where
    G: Rng + ?Sized,
{
    let aggregator = ComplianceAggregator::new(catalog);

    let monthly = aggregator.monthly_compliance(reports, reference);
    let inspector_ranking = aggregator.rank_inspectors(reports, &catalog.inspectors(), reference);
    let top = top_inspector(&inspector_ranking).cloned();

    let low_performing_areas: Vec<LowPerformingArea> = aggregator
        .low_performing_locations(
            reports,
            options.low_performance_threshold,
            options.low_performance_limit,
        )
        .into_iter()
        .map(|entry| name_area(catalog, entry))
        .collect();

    let insights = vec![
        area_insight(low_performing_areas.first()),
        inspector_insight(top.as_ref()),
    ];

    let performance = aggregator.daily_series(reports, reference, options.window_days, rng);

    let activity = reports
        .iter()
        .rev()
        .take(options.activity_limit)
        .map(|report| {
            let score = aggregator.score(report);
            ActivityEntry {
                report_id: report.id.clone(),
                reference_number: report.reference_number.clone(),
                inspector_name: catalog
                    .user(&report.inspector_id)
                    .map(|user| user.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                location_name: catalog
                    .location(&report.location_id)
                    .map(|location| location.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                date: report.date,
                status: report.status,
                score,
                critical: aggregator.is_critical(report),
                band: ComplianceBand::for_score(score),
            }
        })
        .collect();

    ManagerDashboard {
        reference_date: reference,
        overall_compliance: monthly.current,
        previous_compliance: monthly.previous,
        compliance_trend: monthly.trend,
        total_inspections: monthly.total_inspections,
        critical_issues: monthly.critical_issues,
        top_inspector: top,
        inspector_ranking,
        low_performing_areas,
        insights,
        performance,
        activity,
    }
}

fn name_area(catalog: &ReferenceCatalog, entry: LocationRiskEntry) -> LowPerformingArea {
    let location_name = catalog
        .location(&entry.location_id)
        .map(|location| location.name.clone())
        .unwrap_or_else(|| entry.location_id.to_string());
    let zone_name = catalog
        .zone_for_location(&entry.location_id)
        .map(|zone| zone.name.clone());

    LowPerformingArea {
        band: ComplianceBand::for_score(entry.avg_score),
        location_id: entry.location_id,
        location_name,
        zone_name,
        avg_score: entry.avg_score,
        report_count: entry.report_count,
    }
}

fn area_insight(lowest: Option<&LowPerformingArea>) -> String {
    match lowest {
        Some(area) => format!(
            "{} recorded {} low score{} this week. Follow-up inspection recommended.",
            area.location_name,
            area.report_count,
            if area.report_count == 1 { "" } else { "s" }
        ),
        None => "All areas are performing well.".to_string(),
    }
}

fn inspector_insight(top: Option<&InspectorRanking>) -> String {
    match top {
        Some(entry) => format!(
            "{} has the highest consistency score this month.",
            entry.inspector.name
        ),
        None => "Not enough data to rank inspectors.".to_string(),
    }
}
