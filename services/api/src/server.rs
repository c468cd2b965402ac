use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryNotificationFeed, InMemoryReportRepository};
use crate::routes::with_inspection_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use ward_inspect::config::AppConfig;
use ward_inspect::error::AppError;
use ward_inspect::inspections::{DashboardOptions, InspectionService, ReferenceCatalog};
use ward_inspect::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let notifications = Arc::new(InMemoryNotificationFeed::default());
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        notifications: notifications.clone(),
    };

    let catalog = Arc::new(ReferenceCatalog::standard());
    let seed_reports = catalog.sample_reports(Utc::now());
    info!(reports = seed_reports.len(), "seeded inspection history");
    let repository = Arc::new(InMemoryReportRepository::seeded(seed_reports));

    let dashboard_options = DashboardOptions {
        window_days: config.dashboard.window_days,
        ..DashboardOptions::default()
    };
    let inspection_service = Arc::new(
        InspectionService::new(catalog, repository, notifications)
            .with_dashboard_options(dashboard_options)
            .with_forecast_seed(config.dashboard.forecast_seed),
    );

    let app = with_inspection_routes(inspection_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "inspection service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
