use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::compliance::MAX_WINDOW_DAYS;
use super::domain::{
    InspectionReport, LocationId, ReportId, ReportStatus, RiskCategory, User, UserId,
};
use super::notifications::NotificationPublisher;
use super::repository::{ReportRepository, RepositoryError};
use super::service::{InspectionService, ReportServiceError, SaveIntent};

/// Header carrying the mock login identity.
pub const USER_HEADER: &str = "x-user-id";

/// Dashboard reference dates must fall within these calendar years.
const REFERENCE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub location_id: LocationId,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub report: InspectionReport,
    pub intent: SaveIntent,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub comment: String,
    #[serde(default)]
    pub outcome: Option<ReportStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub today: Option<NaiveDate>,
    pub seed: Option<u64>,
    pub window_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub risk: Option<RiskCategory>,
}

/// Locations offered when starting an inspection, grouped by zone risk.
#[derive(Debug, Serialize)]
struct LocationGroup<'a> {
    risk: RiskCategory,
    label: &'static str,
    locations: Vec<LocationOption<'a>>,
}

#[derive(Debug, Serialize)]
struct LocationOption<'a> {
    id: &'a LocationId,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone_name: Option<&'a str>,
}

/// Router exposing report lifecycle and dashboard endpoints.
pub fn report_router<R, N>(service: Arc<InspectionService<R, N>>) -> Router
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/dashboard", get(dashboard_handler::<R, N>))
        .route("/api/v1/locations", get(locations_handler::<R, N>))
        .route(
            "/api/v1/reports",
            get(list_handler::<R, N>).post(create_handler::<R, N>),
        )
        .route("/api/v1/reports/drafts", post(draft_handler::<R, N>))
        .route(
            "/api/v1/reports/:report_id",
            get(detail_handler::<R, N>).put(update_handler::<R, N>),
        )
        .route(
            "/api/v1/reports/:report_id/feedback",
            post(feedback_handler::<R, N>),
        )
        .with_state(service)
}

fn resolve_actor<R, N>(
    service: &InspectionService<R, N>,
    headers: &HeaderMap,
) -> Result<User, Response>
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let Some(user_id) = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        let payload = json!({ "error": format!("missing {USER_HEADER} header") });
        return Err((StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response());
    };

    service.actor(&UserId::new(user_id)).map_err(|error| {
        let payload = json!({ "error": error.to_string() });
        (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
    })
}

fn error_response(error: ReportServiceError) -> Response {
    let status = match &error {
        ReportServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ReportServiceError::UnknownUser(_) => StatusCode::UNAUTHORIZED,
        ReportServiceError::NotEditable(_)
        | ReportServiceError::NotSubmitted(_)
        | ReportServiceError::InvalidTransition { .. }
        | ReportServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReportServiceError::UnknownLocation(_)
        | ReportServiceError::InvalidItem(_)
        | ReportServiceError::DuplicateItem(_)
        | ReportServiceError::ScoreOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ReportServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReportServiceError::Repository(_) | ReportServiceError::Notification(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn invalid_query(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

pub(crate) async fn dashboard_handler<R, N>(
    State(service): State<Arc<InspectionService<R, N>>>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match resolve_actor(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let mut options = service.dashboard_options();
    if let Some(window_days) = query.window_days {
        if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
            return invalid_query(format!(
                "window_days must be between 1 and {MAX_WINDOW_DAYS}"
            ));
        }
        options.window_days = window_days;
    }

    let reference = query.today.unwrap_or_else(|| Utc::now().date_naive());
    if !REFERENCE_YEARS.contains(&reference.year()) {
        return invalid_query(format!(
            "today must fall between years {} and {}",
            REFERENCE_YEARS.start(),
            REFERENCE_YEARS.end()
        ));
    }
    let mut rng = service.forecast_rng(query.seed);

    match service.dashboard(&actor, reference, &options, &mut rng) {
        Ok(dashboard) => (StatusCode::OK, axum::Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn locations_handler<R, N>(
    State(service): State<Arc<InspectionService<R, N>>>,
    headers: HeaderMap,
    Query(query): Query<LocationQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    if let Err(response) = resolve_actor(&service, &headers) {
        return response;
    }

    let catalog = service.catalog();
    let groups: Vec<LocationGroup<'_>> = RiskCategory::ordered()
        .into_iter()
        .filter(|risk| query.risk.map_or(true, |wanted| wanted == *risk))
        .map(|risk| LocationGroup {
            risk,
            label: risk.label(),
            locations: catalog
                .locations_for_risk(risk)
                .into_iter()
                .map(|location| LocationOption {
                    id: &location.id,
                    name: &location.name,
                    zone_name: catalog.zone(&location.zone_id).map(|zone| zone.name.as_str()),
                })
                .collect(),
        })
        .collect();

    (StatusCode::OK, axum::Json(groups)).into_response()
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<InspectionService<R, N>>>,
    headers: HeaderMap,
) -> Response
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match resolve_actor(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.list(&actor) {
        Ok(reports) => {
            let details: Vec<_> = reports
                .into_iter()
                .map(|report| service.describe(&actor, report))
                .collect();
            (StatusCode::OK, axum::Json(details)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn draft_handler<R, N>(
    State(service): State<Arc<InspectionService<R, N>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<DraftRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match resolve_actor(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.start_draft(&actor, &request.location_id, Utc::now()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R, N>(
    State(service): State<Arc<InspectionService<R, N>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<SaveRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match resolve_actor(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.save(&actor, request.report, request.intent, Utc::now()) {
        Ok(report) => {
            let detail = service.describe(&actor, report);
            (StatusCode::CREATED, axum::Json(detail)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R, N>(
    State(service): State<Arc<InspectionService<R, N>>>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
    axum::Json(mut request): axum::Json<SaveRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match resolve_actor(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let id = ReportId(report_id);
    match service.get(&actor, &id) {
        Ok(_) => {}
        Err(error) => return error_response(error),
    }

    request.report.id = id;
    match service.save(&actor, request.report, request.intent, Utc::now()) {
        Ok(report) => {
            let detail = service.describe(&actor, report);
            (StatusCode::OK, axum::Json(detail)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<R, N>(
    State(service): State<Arc<InspectionService<R, N>>>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match resolve_actor(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.detail(&actor, &ReportId(report_id)) {
        Ok(detail) => (StatusCode::OK, axum::Json(detail)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn feedback_handler<R, N>(
    State(service): State<Arc<InspectionService<R, N>>>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
    axum::Json(request): axum::Json<FeedbackRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match resolve_actor(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.record_feedback(
        &actor,
        &ReportId(report_id),
        request.comment,
        request.outcome,
    ) {
        Ok(report) => {
            let detail = service.describe(&actor, report);
            (StatusCode::OK, axum::Json(detail)).into_response()
        }
        Err(error) => error_response(error),
    }
}
