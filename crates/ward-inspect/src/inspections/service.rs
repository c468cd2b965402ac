use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::catalog::ReferenceCatalog;
use super::compliance::{ComplianceAggregator, ComplianceBand};
use super::dashboard::{build_dashboard, DashboardOptions, ManagerDashboard};
use super::domain::{
    InspectionForm, InspectionReport, InspectionResultItem, ItemId, LocationId, ReportId,
    ReportStatus, User, UserId,
};
use super::notifications::{submission_notification, NotificationError, NotificationPublisher};
use super::repository::{ReportRepository, RepositoryError};

/// Reference number carried by reports that have not been submitted yet.
pub const DRAFT_REFERENCE: &str = "DRAFT";

/// What the inspector wants to happen when saving a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveIntent {
    Draft,
    Submit,
}

impl SaveIntent {
    const fn status(self) -> ReportStatus {
        match self {
            Self::Draft => ReportStatus::Draft,
            Self::Submit => ReportStatus::Submitted,
        }
    }
}

/// Report enriched with its score and reference names for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDetail {
    pub report: InspectionReport,
    pub score: f64,
    pub band: ComplianceBand,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspector_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    pub editable: bool,
}

/// Service composing the reference catalog, report repository, and
/// notification hooks behind role checks.
pub struct InspectionService<R, N> {
    catalog: Arc<ReferenceCatalog>,
    repository: Arc<R>,
    notifications: Arc<N>,
    dashboard_options: DashboardOptions,
    forecast_seed: Option<u64>,
}

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REFERENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

fn next_reference_number(submitted_at: DateTime<Utc>) -> String {
    let sequence = REFERENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("INSP-{}-{sequence:04}", submitted_at.year())
}

impl<R, N> InspectionService<R, N>
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(catalog: Arc<ReferenceCatalog>, repository: Arc<R>, notifications: Arc<N>) -> Self {
        Self {
            catalog,
            repository,
            notifications,
            dashboard_options: DashboardOptions::default(),
            forecast_seed: None,
        }
    }

    pub fn with_dashboard_options(mut self, options: DashboardOptions) -> Self {
        self.dashboard_options = options;
        self
    }

    /// Pins the dashboard forecast when callers do not provide their own seed.
    pub fn with_forecast_seed(mut self, seed: Option<u64>) -> Self {
        self.forecast_seed = seed;
        self
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        self.dashboard_options
    }

    /// Generator for the dashboard forecast: `seed`, else the configured
    /// seed, else OS entropy.
    pub fn forecast_rng(&self, seed: Option<u64>) -> StdRng {
        match seed.or(self.forecast_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// Resolve the acting user from the mock single-field login.
    pub fn actor(&self, user_id: &UserId) -> Result<User, ReportServiceError> {
        self.catalog
            .user(user_id)
            .cloned()
            .ok_or_else(|| ReportServiceError::UnknownUser(user_id.clone()))
    }

    /// Open a new, unsaved draft for `location_id` with every item at full marks.
    pub fn start_draft(
        &self,
        actor: &User,
        location_id: &LocationId,
        now: DateTime<Utc>,
    ) -> Result<InspectionReport, ReportServiceError> {
        if !actor.is_inspector() {
            return Err(ReportServiceError::Forbidden {
                action: "start inspections",
            });
        }

        let form = self.form_for(location_id)?;
        Ok(InspectionReport {
            id: next_report_id(),
            reference_number: DRAFT_REFERENCE.to_string(),
            inspector_id: actor.id.clone(),
            location_id: location_id.clone(),
            date: now,
            status: ReportStatus::Draft,
            items: form
                .items
                .iter()
                .map(InspectionResultItem::full_marks)
                .collect(),
            supervisor_comment: None,
        })
    }

    /// Persist a report as a draft or submit it.
    ///
    /// Reports unknown to the repository are appended; stored reports are
    /// replaced only while they are drafts owned by `actor`.
    pub fn save(
        &self,
        actor: &User,
        mut report: InspectionReport,
        intent: SaveIntent,
        now: DateTime<Utc>,
    ) -> Result<InspectionReport, ReportServiceError> {
        let existing = self.repository.fetch(&report.id)?;
        let is_new = existing.is_none();

        match &existing {
            Some(stored) => {
                if !stored.is_editable_by(actor, false) {
                    return Err(ReportServiceError::NotEditable(stored.id.clone()));
                }
                report.inspector_id = stored.inspector_id.clone();
                report.location_id = stored.location_id.clone();
                report.reference_number = stored.reference_number.clone();
                report.supervisor_comment = stored.supervisor_comment.clone();
            }
            None => {
                if !actor.is_inspector() {
                    return Err(ReportServiceError::Forbidden {
                        action: "create inspection reports",
                    });
                }
                report.inspector_id = actor.id.clone();
                report.reference_number = DRAFT_REFERENCE.to_string();
                report.supervisor_comment = None;
            }
        }

        let form = self.form_for(&report.location_id)?;
        validate_items(form, &report.items)?;

        report.status = intent.status();
        if intent == SaveIntent::Submit {
            report.reference_number = next_reference_number(now);
        }

        if is_new {
            report = self.repository.append(report)?;
        } else {
            self.repository.replace(report.clone())?;
        }

        info!(
            report_id = %report.id,
            inspector_id = %report.inspector_id,
            status = report.status.label(),
            "inspection report saved"
        );

        if intent == SaveIntent::Submit {
            self.notify_submission(&report, now)?;
        }

        Ok(report)
    }

    /// Attach supervisor feedback and optionally decide the review outcome.
    pub fn record_feedback(
        &self,
        actor: &User,
        report_id: &ReportId,
        comment: String,
        outcome: Option<ReportStatus>,
    ) -> Result<InspectionReport, ReportServiceError> {
        if !actor.is_supervisor() {
            return Err(ReportServiceError::Forbidden {
                action: "review inspection reports",
            });
        }

        let mut report = self
            .repository
            .fetch(report_id)?
            .ok_or(RepositoryError::NotFound)?;

        if report.status == ReportStatus::Draft {
            return Err(ReportServiceError::NotSubmitted(report.id));
        }

        if let Some(next) = outcome {
            if !report.status.can_review_into(next) {
                return Err(ReportServiceError::InvalidTransition {
                    from: report.status,
                    to: next,
                });
            }
            report.status = next;
        }

        report.supervisor_comment = Some(comment);
        self.repository.replace(report.clone())?;

        info!(
            report_id = %report.id,
            supervisor_id = %actor.id,
            status = report.status.label(),
            "supervisor feedback recorded"
        );

        Ok(report)
    }

    /// Fetch a report the actor is allowed to see.
    pub fn get(
        &self,
        actor: &User,
        report_id: &ReportId,
    ) -> Result<InspectionReport, ReportServiceError> {
        let report = self
            .repository
            .fetch(report_id)?
            .ok_or(RepositoryError::NotFound)?;

        if actor.is_inspector() && report.inspector_id != actor.id {
            return Err(ReportServiceError::Forbidden {
                action: "view other inspectors' reports",
            });
        }

        Ok(report)
    }

    pub fn detail(
        &self,
        actor: &User,
        report_id: &ReportId,
    ) -> Result<ReportDetail, ReportServiceError> {
        let report = self.get(actor, report_id)?;
        Ok(self.describe(actor, report))
    }

    /// Inspectors see their own reports; supervisors see everything.
    pub fn list(&self, actor: &User) -> Result<Vec<InspectionReport>, ReportServiceError> {
        let reports = self.repository.snapshot()?;
        if actor.is_supervisor() {
            return Ok(reports);
        }

        Ok(reports
            .into_iter()
            .filter(|report| report.inspector_id == actor.id)
            .collect())
    }

    pub fn describe(&self, actor: &User, report: InspectionReport) -> ReportDetail {
        let score = ComplianceAggregator::new(self.catalog.as_ref()).score(&report);
        ReportDetail {
            band: ComplianceBand::for_report_score(score),
            status_label: report.status.label(),
            inspector_name: self
                .catalog
                .user(&report.inspector_id)
                .map(|user| user.name.clone()),
            location_name: self
                .catalog
                .location(&report.location_id)
                .map(|location| location.name.clone()),
            zone_name: self
                .catalog
                .zone_for_location(&report.location_id)
                .map(|zone| zone.name.clone()),
            editable: report.is_editable_by(actor, false),
            score,
            report,
        }
    }

    /// Manager dashboard over the current report snapshot. Supervisors only.
    pub fn dashboard<G>(
        &self,
        actor: &User,
        reference: NaiveDate,
        options: &DashboardOptions,
        rng: &mut G,
    ) -> Result<ManagerDashboard, ReportServiceError>
    where
        G: Rng + ?Sized,
    {
        if !actor.is_supervisor() {
            return Err(ReportServiceError::Forbidden {
                action: "view the manager dashboard",
            });
        }

        let reports = self.repository.snapshot()?;
        Ok(build_dashboard(
            &self.catalog,
            &reports,
            reference,
            options,
            rng,
        ))
    }

    fn form_for(&self, location_id: &LocationId) -> Result<&InspectionForm, ReportServiceError> {
        use super::compliance::FormResolver;

        self.catalog
            .form_for_location(location_id)
            .ok_or_else(|| ReportServiceError::UnknownLocation(location_id.clone()))
    }

    fn notify_submission(
        &self,
        report: &InspectionReport,
        now: DateTime<Utc>,
    ) -> Result<(), ReportServiceError> {
        let score = ComplianceAggregator::new(self.catalog.as_ref()).score(report);
        let inspector_name = self
            .catalog
            .user(&report.inspector_id)
            .map(|user| user.name.as_str())
            .unwrap_or("Unknown inspector");
        let location_name = self
            .catalog
            .location(&report.location_id)
            .map(|location| location.name.as_str())
            .unwrap_or("unknown location");

        self.notifications.publish(submission_notification(
            report,
            score,
            inspector_name,
            location_name,
            now,
        ))?;
        Ok(())
    }
}

fn validate_items(
    form: &InspectionForm,
    items: &[InspectionResultItem],
) -> Result<(), ReportServiceError> {
    let mut seen = HashSet::with_capacity(items.len());
    for result in items {
        if !seen.insert(&result.item_id) {
            return Err(ReportServiceError::DuplicateItem(result.item_id.clone()));
        }
        let item = form
            .item(&result.item_id)
            .ok_or_else(|| ReportServiceError::InvalidItem(result.item_id.clone()))?;
        if result.score > item.max_score {
            return Err(ReportServiceError::ScoreOutOfRange {
                item_id: result.item_id.clone(),
                score: result.score,
                max_score: item.max_score,
            });
        }
    }
    Ok(())
}

/// Error raised by the inspection service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error("not permitted to {action}")]
    Forbidden { action: &'static str },
    #[error("unknown user '{0}'")]
    UnknownUser(UserId),
    #[error("no inspection form configured for location '{0}'")]
    UnknownLocation(LocationId),
    #[error("report '{0}' can no longer be edited")]
    NotEditable(ReportId),
    #[error("report '{0}' has not been submitted")]
    NotSubmitted(ReportId),
    #[error("cannot move report from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: ReportStatus,
        to: ReportStatus,
    },
    #[error("item '{0}' is not part of the inspection form")]
    InvalidItem(ItemId),
    #[error("item '{0}' is scored more than once")]
    DuplicateItem(ItemId),
    #[error("item '{item_id}' scored {score} but allows at most {max_score}")]
    ScoreOutOfRange {
        item_id: ItemId,
        score: u32,
        max_score: u32,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}
