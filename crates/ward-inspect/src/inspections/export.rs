use super::catalog::ReferenceCatalog;
use super::compliance::{ComplianceAggregator, MonthWindows};
use super::domain::InspectionReport;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "failed to write monthly export: {}", err),
            ExportError::Csv(err) => write!(f, "could not encode monthly export: {}", err),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Serialize)]
struct MonthlyRow<'a> {
    reference_number: &'a str,
    date: String,
    inspector: &'a str,
    location: &'a str,
    zone: &'a str,
    status: &'static str,
    score: String,
}

/// Writes the reports dated in the calendar month of `reference` as CSV and
/// returns the number of data rows written.
pub fn write_monthly_csv<W: Write>(
    writer: W,
    catalog: &ReferenceCatalog,
    reports: &[InspectionReport],
    reference: NaiveDate,
) -> Result<usize, ExportError> {
    let windows = MonthWindows::anchored_at(reference);
    let aggregator = ComplianceAggregator::new(catalog);
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for report in reports
        .iter()
        .filter(|report| windows.in_current(report.date.date_naive()))
    {
        csv_writer.serialize(MonthlyRow {
            reference_number: &report.reference_number,
            date: report.date.format("%Y-%m-%d").to_string(),
            inspector: catalog
                .user(&report.inspector_id)
                .map(|user| user.name.as_str())
                .unwrap_or(report.inspector_id.as_str()),
            location: catalog
                .location(&report.location_id)
                .map(|location| location.name.as_str())
                .unwrap_or(report.location_id.as_str()),
            zone: catalog
                .zone_for_location(&report.location_id)
                .map(|zone| zone.name.as_str())
                .unwrap_or(""),
            status: report.status.label(),
            score: format!("{:.1}", aggregator.score(report)),
        })?;
        rows += 1;
    }

    // An empty month still yields the header row.
    if rows == 0 {
        csv_writer.write_record([
            "reference_number",
            "date",
            "inspector",
            "location",
            "zone",
            "status",
            "score",
        ])?;
    }

    csv_writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn export_covers_only_the_reference_month() {
        let catalog = ReferenceCatalog::standard();
        let now = Utc.with_ymd_and_hms(2025, 10, 28, 12, 0, 0).unwrap();
        let mut reports = catalog.sample_reports(now);
        let mut stale = reports[0].clone();
        stale.date = Utc.with_ymd_and_hms(2025, 9, 20, 9, 0, 0).unwrap();
        reports.push(stale);

        let mut buffer = Vec::new();
        let rows = write_monthly_csv(&mut buffer, &catalog, &reports, now.date_naive())
            .expect("export succeeds");

        let text = String::from_utf8(buffer).expect("utf-8 output");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("reference_number,date,inspector,location,zone,status,score")
        );
        assert_eq!(rows, 15);
        assert_eq!(lines.count(), 15);
        assert!(!text.contains("2025-09-20"));
    }

    #[test]
    fn empty_months_still_write_a_header() {
        let catalog = ReferenceCatalog::standard();
        let reference = NaiveDate::from_ymd_opt(2025, 10, 28).expect("valid date");

        let mut buffer = Vec::new();
        let rows = write_monthly_csv(&mut buffer, &catalog, &[], reference).expect("export");

        assert_eq!(rows, 0);
        assert_eq!(
            String::from_utf8(buffer).expect("utf-8 output"),
            "reference_number,date,inspector,location,zone,status,score\n"
        );
    }
}
