//! Hospital inspection reporting: reference data, the report lifecycle,
//! compliance scoring, and the manager dashboard.

pub mod catalog;
pub mod compliance;
pub mod dashboard;
pub mod domain;
pub mod export;
pub mod notifications;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::ReferenceCatalog;
pub use compliance::{ComplianceAggregator, ComplianceBand, FormResolver};
pub use dashboard::{build_dashboard, DashboardOptions, ManagerDashboard};
pub use domain::{
    EvaluationItem, FormId, InspectionForm, InspectionReport, InspectionResultItem, ItemId,
    Location, LocationId, NotificationId, ReportId, ReportStatus, RiskCategory, User, UserId,
    UserRole, Zone, ZoneId,
};
pub use export::{write_monthly_csv, ExportError};
pub use notifications::{
    Notification, NotificationError, NotificationKind, NotificationPublisher,
};
pub use repository::{ReportRepository, RepositoryError};
pub use router::{report_router, USER_HEADER};
pub use service::{InspectionService, ReportDetail, ReportServiceError, SaveIntent};
