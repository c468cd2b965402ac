use super::super::domain::InspectionReport;
use super::{ComplianceAggregator, FormResolver, MonthWindows, MonthlyCompliance};
use chrono::NaiveDate;

impl<'a, R> ComplianceAggregator<'a, R>
where
    R: FormResolver + ?Sized,
{
    /// Current versus previous calendar month compliance, anchored at `reference`.
    pub fn monthly_compliance(
        &self,
        reports: &[InspectionReport],
        reference: NaiveDate,
    ) -> MonthlyCompliance {
        let windows = MonthWindows::anchored_at(reference);

        let current_reports: Vec<&InspectionReport> = reports
            .iter()
            .filter(|report| windows.in_current(report.date.date_naive()))
            .collect();
        let previous_reports = reports
            .iter()
            .filter(|report| windows.in_previous(report.date.date_naive()));

        let current = self.average(current_reports.iter().copied());
        let previous = self.average(previous_reports);
        let critical_issues = current_reports
            .iter()
            .filter(|report| self.is_critical(report))
            .count();

        MonthlyCompliance {
            current,
            previous,
            trend: current - previous,
            critical_issues,
            total_inspections: current_reports.len(),
        }
    }
}
