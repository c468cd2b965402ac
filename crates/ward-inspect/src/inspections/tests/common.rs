use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::inspections::domain::{InspectionReport, ItemId, ReportId, User, UserId};
use crate::inspections::notifications::{Notification, NotificationError, NotificationPublisher};
use crate::inspections::repository::{ReportRepository, RepositoryError};
use crate::inspections::{report_router, InspectionService, ReferenceCatalog};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 28, 12, 0, 0).unwrap()
}

pub(super) fn catalog() -> Arc<ReferenceCatalog> {
    Arc::new(ReferenceCatalog::standard())
}

pub(super) fn user(catalog: &ReferenceCatalog, id: &str) -> User {
    catalog
        .user(&UserId::new(id))
        .cloned()
        .expect("seeded user")
}

pub(super) fn build_service() -> (
    InspectionService<MemoryRepository, MemoryNotifications>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = InspectionService::new(catalog(), repository.clone(), notifications.clone());
    (service, repository, notifications)
}

pub(super) fn seeded_service() -> (
    InspectionService<MemoryRepository, MemoryNotifications>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
) {
    let (service, repository, notifications) = build_service();
    for report in service.catalog().sample_reports(now()) {
        repository.append(report).expect("seed report");
    }
    (service, repository, notifications)
}

/// Zeroes the given items so the report lands below the critical threshold.
pub(super) fn zero_items(report: &mut InspectionReport, items: &[&str]) {
    for result in &mut report.items {
        if items.contains(&result.item_id.as_str()) {
            result.score = 0;
        }
    }
}

pub(super) fn item(id: &str) -> ItemId {
    ItemId::new(id)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<InspectionReport>>>,
}

impl ReportRepository for MemoryRepository {
    fn append(&self, report: InspectionReport) -> Result<InspectionReport, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|stored| stored.id == report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(report.clone());
        Ok(report)
    }

    fn replace(&self, report: InspectionReport) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|stored| stored.id == report.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = report;
        Ok(())
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<InspectionReport>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|stored| &stored.id == id).cloned())
    }

    fn snapshot(&self) -> Result<Vec<InspectionReport>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl ReportRepository for UnavailableRepository {
    fn append(&self, _report: InspectionReport) -> Result<InspectionReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace(&self, _report: InspectionReport) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<InspectionReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn snapshot(&self) -> Result<Vec<InspectionReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct OfflineNotifications;

impl NotificationPublisher for OfflineNotifications {
    fn publish(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay down".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: InspectionService<MemoryRepository, MemoryNotifications>,
) -> axum::Router {
    report_router(Arc::new(service))
}
