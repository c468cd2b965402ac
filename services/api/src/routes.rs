use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use ward_inspect::inspections::{
    report_router, InspectionService, NotificationId, NotificationPublisher, ReportRepository,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MarkReadRequest {
    /// Notifications to mark read; empty marks the whole feed.
    #[serde(default)]
    pub(crate) ids: Vec<NotificationId>,
}

pub(crate) fn with_inspection_routes<R, N>(service: Arc<InspectionService<R, N>>) -> axum::Router
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    report_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/notifications",
            axum::routing::get(notifications_endpoint),
        )
        .route(
            "/api/v1/notifications/read",
            axum::routing::post(mark_read_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn notifications_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    let feed = &state.notifications;
    Json(json!({
        "unread": feed.unread_count(),
        "notifications": feed.list(),
    }))
}

pub(crate) async fn mark_read_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<MarkReadRequest>,
) -> Json<serde_json::Value> {
    let updated = state.notifications.mark_read(&request.ids);
    Json(json!({
        "updated": updated,
        "unread": state.notifications.unread_count(),
    }))
}
