use super::domain::{InspectionReport, ReportId};

/// Storage abstraction for inspection reports.
///
/// Mutations replace whole records; the last writer wins. `snapshot` returns
/// reports in insertion order without any implicit sort.
pub trait ReportRepository: Send + Sync {
    fn append(&self, report: InspectionReport) -> Result<InspectionReport, RepositoryError>;
    fn replace(&self, report: InspectionReport) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<InspectionReport>, RepositoryError>;
    fn snapshot(&self) -> Result<Vec<InspectionReport>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("report already exists")]
    Conflict,
    #[error("report not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
