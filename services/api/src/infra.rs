use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use ward_inspect::inspections::{
    InspectionReport, Notification, NotificationError, NotificationId, NotificationPublisher,
    ReportId, ReportRepository, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) notifications: Arc<InMemoryNotificationFeed>,
}

/// Report store kept in insertion order; mutations replace whole records.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    reports: Arc<Mutex<Vec<InspectionReport>>>,
}

impl InMemoryReportRepository {
    pub(crate) fn seeded(reports: Vec<InspectionReport>) -> Self {
        Self {
            reports: Arc::new(Mutex::new(reports)),
        }
    }
}

impl ReportRepository for InMemoryReportRepository {
    fn append(&self, report: InspectionReport) -> Result<InspectionReport, RepositoryError> {
        let mut guard = self.reports.lock().expect("repository mutex poisoned");
        if guard.iter().any(|stored| stored.id == report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(report.clone());
        Ok(report)
    }

    fn replace(&self, report: InspectionReport) -> Result<(), RepositoryError> {
        let mut guard = self.reports.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|stored| stored.id == report.id) {
            Some(slot) => {
                *slot = report;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<InspectionReport>, RepositoryError> {
        let guard = self.reports.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|stored| &stored.id == id).cloned())
    }

    fn snapshot(&self) -> Result<Vec<InspectionReport>, RepositoryError> {
        let guard = self.reports.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }
}

/// In-app notification feed; newest entries are listed first.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationFeed {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotificationFeed {
    pub(crate) fn list(&self) -> Vec<Notification> {
        let guard = self.entries.lock().expect("notification mutex poisoned");
        guard.iter().rev().cloned().collect()
    }

    pub(crate) fn unread_count(&self) -> usize {
        let guard = self.entries.lock().expect("notification mutex poisoned");
        guard.iter().filter(|entry| !entry.is_read).count()
    }

    /// Marks the given notifications read, or every notification when `ids`
    /// is empty. Returns how many entries changed.
    pub(crate) fn mark_read(&self, ids: &[NotificationId]) -> usize {
        let mut guard = self.entries.lock().expect("notification mutex poisoned");
        let mut changed = 0;
        for entry in guard
            .iter_mut()
            .filter(|entry| ids.is_empty() || ids.contains(&entry.id))
        {
            if !entry.is_read {
                entry.is_read = true;
                changed += 1;
            }
        }
        changed
    }
}

impl NotificationPublisher for InMemoryNotificationFeed {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut guard = self.entries.lock().expect("notification mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ward_inspect::inspections::NotificationKind;

    fn notification(id: &str) -> Notification {
        Notification {
            id: NotificationId::new(id),
            kind: NotificationKind::Info,
            message: format!("message {id}"),
            timestamp: Utc::now(),
            is_read: false,
            link: None,
        }
    }

    #[test]
    fn feed_lists_newest_first_and_marks_read() {
        let feed = InMemoryNotificationFeed::default();
        feed.publish(notification("n1")).expect("publish");
        feed.publish(notification("n2")).expect("publish");
        feed.publish(notification("n3")).expect("publish");

        let listed: Vec<String> = feed.list().into_iter().map(|entry| entry.id.0).collect();
        assert_eq!(listed, vec!["n3", "n2", "n1"]);

        assert_eq!(feed.mark_read(&[NotificationId::new("n2")]), 1);
        assert_eq!(feed.unread_count(), 2);
        assert_eq!(feed.mark_read(&[]), 2);
        assert_eq!(feed.unread_count(), 0);
    }

    #[test]
    fn replace_requires_an_existing_report() {
        let repository = InMemoryReportRepository::default();
        let catalog = ward_inspect::inspections::ReferenceCatalog::standard();
        let report = catalog
            .sample_reports(Utc::now())
            .into_iter()
            .next()
            .expect("sample report");

        assert!(matches!(
            repository.replace(report.clone()),
            Err(RepositoryError::NotFound)
        ));
        repository.append(report.clone()).expect("append");
        assert!(matches!(
            repository.append(report),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("2025-10-28").is_ok());
        assert!(parse_date("10/28/2025").is_err());
    }
}
