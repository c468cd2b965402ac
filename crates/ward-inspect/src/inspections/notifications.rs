use super::compliance::CRITICAL_SCORE_THRESHOLD;
use super::domain::{InspectionReport, NotificationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Alert,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Outbound hook for workflow notifications (in-app feed, e-mail adapters).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_notification_id() -> NotificationId {
    let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    NotificationId(format!("notif-{id:06}"))
}

/// Notification raised when an inspector submits a report: an alert for
/// critical scores, a success message otherwise.
pub fn submission_notification(
    report: &InspectionReport,
    score: f64,
    inspector_name: &str,
    location_name: &str,
    timestamp: DateTime<Utc>,
) -> Notification {
    let (kind, message) = if score < CRITICAL_SCORE_THRESHOLD {
        (
            NotificationKind::Alert,
            format!(
                "Critical low score ({score:.0}%) detected at {location_name} by {inspector_name}."
            ),
        )
    } else {
        (
            NotificationKind::Success,
            format!(
                "{inspector_name} completed inspection at {location_name} with a score of {score:.0}%."
            ),
        )
    };

    Notification {
        id: next_notification_id(),
        kind,
        message,
        timestamp,
        is_read: false,
        link: Some(format!("/report/{}", report.id)),
    }
}
