use super::super::domain::{InspectionReport, LocationId};
use super::{ComplianceAggregator, FormResolver, LocationRiskEntry};
use std::collections::HashMap;

impl<'a, R> ComplianceAggregator<'a, R>
where
    R: FormResolver + ?Sized,
{
    /// Per-location average over the full report history, in the order each
    /// location first appears in `reports`.
    pub fn location_averages(&self, reports: &[InspectionReport]) -> Vec<LocationRiskEntry> {
        let mut positions: HashMap<&LocationId, usize> = HashMap::new();
        let mut totals: Vec<(&LocationId, f64, usize)> = Vec::new();

        for report in reports {
            let score = self.score(report);
            match positions.get(&report.location_id) {
                Some(&index) => {
                    let entry = &mut totals[index];
                    entry.1 += score;
                    entry.2 += 1;
                }
                None => {
                    positions.insert(&report.location_id, totals.len());
                    totals.push((&report.location_id, score, 1));
                }
            }
        }

        totals
            .into_iter()
            .map(|(location_id, total, count)| LocationRiskEntry {
                location_id: location_id.clone(),
                avg_score: total / count as f64,
                report_count: count,
            })
            .collect()
    }

    /// Worst locations first, restricted to averages below `threshold` and
    /// capped at `limit` entries.
    pub fn low_performing_locations(
        &self,
        reports: &[InspectionReport],
        threshold: f64,
        limit: usize,
    ) -> Vec<LocationRiskEntry> {
        let mut flagged: Vec<LocationRiskEntry> = self
            .location_averages(reports)
            .into_iter()
            .filter(|entry| entry.avg_score < threshold)
            .collect();

        flagged.sort_by(|a, b| a.avg_score.total_cmp(&b.avg_score));
        flagged.truncate(limit);
        flagged
    }
}
