use super::super::domain::{InspectionReport, User};
use super::{ComplianceAggregator, FormResolver, InspectorRanking, MonthWindows};
use chrono::NaiveDate;

impl<'a, R> ComplianceAggregator<'a, R>
where
    R: FormResolver + ?Sized,
{
    /// Current-month leaderboard: highest average first, then most reports.
    ///
    /// Inspectors without reports this month stay on the board with a `0`
    /// average. Equal entries keep the order of `inspectors`.
    pub fn rank_inspectors(
        &self,
        reports: &[InspectionReport],
        inspectors: &[User],
        reference: NaiveDate,
    ) -> Vec<InspectorRanking> {
        let windows = MonthWindows::anchored_at(reference);

        let mut ranking: Vec<InspectorRanking> = inspectors
            .iter()
            .map(|inspector| {
                let authored: Vec<&InspectionReport> = reports
                    .iter()
                    .filter(|report| {
                        report.inspector_id == inspector.id
                            && windows.in_current(report.date.date_naive())
                    })
                    .collect();

                InspectorRanking {
                    inspector: inspector.clone(),
                    avg_score: self.average(authored.iter().copied()),
                    report_count: authored.len(),
                }
            })
            .collect();

        // `sort_by` is stable, which keeps ties in input order.
        ranking.sort_by(|a, b| {
            b.avg_score
                .total_cmp(&a.avg_score)
                .then_with(|| b.report_count.cmp(&a.report_count))
        });

        ranking
    }
}

/// Leader of a ranking produced by [`ComplianceAggregator::rank_inspectors`].
pub fn top_inspector(ranking: &[InspectorRanking]) -> Option<&InspectorRanking> {
    ranking.first()
}
