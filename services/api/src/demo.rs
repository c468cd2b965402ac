use crate::infra::{InMemoryNotificationFeed, InMemoryReportRepository};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use ward_inspect::config::AppConfig;
use ward_inspect::error::AppError;
use ward_inspect::inspections::{
    write_monthly_csv, DashboardOptions, InspectionService, LocationId, ManagerDashboard,
    ReferenceCatalog, ReportRepository, ReportStatus, SaveIntent, UserId,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Reference date for the dashboard (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Seed for the illustrative forecast; overrides APP_FORECAST_SEED.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Write the reference month's reports as CSV to this path.
    #[arg(long)]
    pub(crate) export_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the demo (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Seed for the illustrative forecast.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

type DemoService = InspectionService<InMemoryReportRepository, InMemoryNotificationFeed>;

/// Midday on `today`, or the current instant when no date is given.
fn reference_instant(today: Option<NaiveDate>) -> DateTime<Utc> {
    today
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(Utc::now)
}

fn seeded_service(
    now: DateTime<Utc>,
    seed: Option<u64>,
    window_days: u32,
) -> (
    DemoService,
    Arc<InMemoryReportRepository>,
    Arc<InMemoryNotificationFeed>,
) {
    let catalog = Arc::new(ReferenceCatalog::standard());
    let repository = Arc::new(InMemoryReportRepository::seeded(
        catalog.sample_reports(now),
    ));
    let notifications = Arc::new(InMemoryNotificationFeed::default());
    let service = InspectionService::new(catalog, repository.clone(), notifications.clone())
        .with_dashboard_options(DashboardOptions {
            window_days,
            ..DashboardOptions::default()
        })
        .with_forecast_seed(seed);
    (service, repository, notifications)
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        today,
        seed,
        export_csv,
    } = args;

    let config = AppConfig::load()?;
    let now = reference_instant(today);
    let (service, repository, _) = seeded_service(
        now,
        seed.or(config.dashboard.forecast_seed),
        config.dashboard.window_days,
    );

    let supervisor = service.actor(&UserId::new("user3"))?;
    let dashboard = service.dashboard(
        &supervisor,
        now.date_naive(),
        &service.dashboard_options(),
        &mut service.forecast_rng(None),
    )?;
    render_dashboard(&dashboard);

    if let Some(path) = export_csv {
        let reports = repository
            .snapshot()
            .map_err(ward_inspect::inspections::ReportServiceError::from)?;
        let writer = BufWriter::new(File::create(&path)?);
        let rows = write_monthly_csv(writer, service.catalog(), &reports, now.date_naive())?;
        println!("\nExported {} report(s) to {}", rows, path.display());
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, seed } = args;
    let now = reference_instant(today);
    let (service, _, notifications) = seeded_service(now, seed, 30);

    println!("Hospital inspection demo ({})", now.date_naive());

    let inspector = service.actor(&UserId::new("user2"))?;
    let supervisor = service.actor(&UserId::new("user3"))?;
    let location = LocationId::new("loc4");

    let mut draft = service.start_draft(&inspector, &location, now)?;
    println!(
        "\n{} opened a draft at {} ({} items pre-filled at full marks)",
        inspector.name,
        service
            .catalog()
            .location(&location)
            .map(|location| location.name.as_str())
            .unwrap_or("unknown location"),
        draft.items.len()
    );

    for result in draft.items.iter_mut().step_by(3) {
        result.score /= 3;
        result.comment = "Needs attention".to_string();
        result.defects = vec!["defect_needs_cleaning".to_string()];
    }
    let saved = service.save(&inspector, draft, SaveIntent::Draft, now)?;
    println!("- Saved as {} ({})", saved.status.label(), saved.reference_number);

    let submitted = service.save(&inspector, saved, SaveIntent::Submit, now)?;
    let detail = service.describe(&inspector, submitted.clone());
    println!(
        "- Submitted as {} with score {:.1}% ({})",
        submitted.reference_number,
        detail.score,
        detail.band.label()
    );

    match service.save(&inspector, submitted.clone(), SaveIntent::Draft, now) {
        Ok(_) => println!("- Unexpected: submitted report was still editable"),
        Err(err) => println!("- Further edits rejected: {}", err),
    }

    println!("\nNotifications");
    for notification in notifications.list() {
        println!("- [{:?}] {}", notification.kind, notification.message);
    }

    let reviewed = service.record_feedback(
        &supervisor,
        &submitted.id,
        "Schedule corrective cleaning before the next shift.".to_string(),
        Some(ReportStatus::NeedsAction),
    )?;
    println!(
        "\n{} reviewed {} -> {}",
        supervisor.name,
        reviewed.reference_number,
        reviewed.status.label()
    );

    let dashboard = service.dashboard(
        &supervisor,
        now.date_naive(),
        &service.dashboard_options(),
        &mut service.forecast_rng(None),
    )?;
    render_dashboard(&dashboard);

    Ok(())
}

pub(crate) fn render_dashboard(dashboard: &ManagerDashboard) {
    println!("\nManager dashboard ({})", dashboard.reference_date);
    println!(
        "- Overall compliance {:.1}% ({:+.1} pts vs last month)",
        dashboard.overall_compliance, dashboard.compliance_trend
    );
    println!(
        "- {} inspections this month, {} critical",
        dashboard.total_inspections, dashboard.critical_issues
    );

    println!("\nInspector ranking");
    for entry in &dashboard.inspector_ranking {
        println!(
            "- {}: {:.1}% over {} report(s)",
            entry.inspector.name, entry.avg_score, entry.report_count
        );
    }

    if dashboard.low_performing_areas.is_empty() {
        println!("\nLow performing areas: none");
    } else {
        println!("\nLow performing areas");
        for area in &dashboard.low_performing_areas {
            println!(
                "- {} ({}): {:.1}% over {} report(s)",
                area.location_name,
                area.zone_name.as_deref().unwrap_or("unzoned"),
                area.avg_score,
                area.report_count
            );
        }
    }

    println!("\nInsights");
    for insight in &dashboard.insights {
        println!("- {}", insight);
    }

    println!("\nDaily performance");
    for bucket in &dashboard.performance {
        let observed = bucket
            .avg_score
            .map(|score| format!("{score:.1}%"))
            .unwrap_or_else(|| "no data".to_string());
        match bucket.predicted {
            Some(predicted) => {
                println!("- {}: {} (forecast {:.1}%)", bucket.label, observed, predicted)
            }
            None => println!("- {}: {}", bucket.label, observed),
        }
    }

    println!("\nRecent activity");
    for entry in dashboard.activity.iter().take(5) {
        println!(
            "- {} {} at {} by {}: {:.1}%{}",
            entry.reference_number,
            entry.status.label(),
            entry.location_name,
            entry.inspector_name,
            entry.score,
            if entry.critical { " (critical)" } else { "" }
        );
    }
}
