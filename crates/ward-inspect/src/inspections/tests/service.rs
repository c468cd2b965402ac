use super::common::*;
use crate::inspections::compliance::ComplianceBand;
use crate::inspections::dashboard::DashboardOptions;
use crate::inspections::domain::{LocationId, ReportId, ReportStatus, UserId};
use crate::inspections::notifications::NotificationKind;
use crate::inspections::repository::{ReportRepository, RepositoryError};
use crate::inspections::service::DRAFT_REFERENCE;
use crate::inspections::{InspectionService, ReportServiceError, SaveIntent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

#[test]
fn start_draft_prefills_full_marks() {
    let (service, repository, _) = build_service();
    let inspector = user(service.catalog(), "user2");

    let draft = service
        .start_draft(&inspector, &LocationId::new("loc4"), now())
        .expect("inspector can start drafts");

    assert_eq!(draft.status, ReportStatus::Draft);
    assert_eq!(draft.reference_number, DRAFT_REFERENCE);
    assert_eq!(draft.inspector_id, inspector.id);
    assert_eq!(draft.items.len(), 16);
    assert_eq!(draft.achieved_total(), 97);
    assert!(
        repository.snapshot().expect("snapshot").is_empty(),
        "drafts stay unsaved until the inspector saves them"
    );
}

#[test]
fn supervisors_cannot_start_inspections() {
    let (service, _, _) = build_service();
    let supervisor = user(service.catalog(), "user3");

    match service.start_draft(&supervisor, &LocationId::new("loc1"), now()) {
        Err(ReportServiceError::Forbidden { .. }) => {}
        other => panic!("expected forbidden error, got {other:?}"),
    }
}

#[test]
fn unknown_locations_are_rejected() {
    let (service, _, _) = build_service();
    let inspector = user(service.catalog(), "user1");

    match service.start_draft(&inspector, &LocationId::new("loc99"), now()) {
        Err(ReportServiceError::UnknownLocation(location)) => {
            assert_eq!(location, LocationId::new("loc99"))
        }
        other => panic!("expected unknown location, got {other:?}"),
    }
}

#[test]
fn submitting_assigns_reference_and_locks_report() {
    let (service, repository, notifications) = build_service();
    let inspector = user(service.catalog(), "user4");

    let draft = service
        .start_draft(&inspector, &LocationId::new("loc2"), now())
        .expect("draft");
    let saved = service
        .save(&inspector, draft.clone(), SaveIntent::Draft, now())
        .expect("draft saves");
    assert_eq!(saved.status, ReportStatus::Draft);
    assert_eq!(saved.reference_number, DRAFT_REFERENCE);
    assert!(notifications.events().is_empty());

    let submitted = service
        .save(&inspector, saved, SaveIntent::Submit, now())
        .expect("submit succeeds");
    assert_eq!(submitted.status, ReportStatus::Submitted);
    assert!(submitted.reference_number.starts_with("INSP-2025-"));

    let stored = repository
        .fetch(&draft.id)
        .expect("fetch succeeds")
        .expect("report stored");
    assert_eq!(stored, submitted);
    assert_eq!(repository.snapshot().expect("snapshot").len(), 1);

    let events = notifications.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationKind::Success);

    match service.save(&inspector, submitted, SaveIntent::Draft, now()) {
        Err(ReportServiceError::NotEditable(id)) => assert_eq!(id, draft.id),
        other => panic!("expected not editable, got {other:?}"),
    }
}

#[test]
fn critical_submission_raises_an_alert() {
    let (service, _, notifications) = build_service();
    let inspector = user(service.catalog(), "user2");

    let mut draft = service
        .start_draft(&inspector, &LocationId::new("loc4"), now())
        .expect("draft");
    zero_items(&mut draft, &["mr_item_5", "mr_item_10", "mr_item_11"]);

    service
        .save(&inspector, draft.clone(), SaveIntent::Submit, now())
        .expect("submit succeeds");

    let events = notifications.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationKind::Alert);
    assert_eq!(
        events[0].message,
        "Critical low score (70%) detected at ER Triage by Fatima Saad."
    );
    assert_eq!(
        events[0].link.as_deref(),
        Some(format!("/report/{}", draft.id).as_str())
    );
}

#[test]
fn drafts_belong_to_their_inspector() {
    let (service, _, _) = build_service();
    let owner = user(service.catalog(), "user1");
    let other = user(service.catalog(), "user2");

    let draft = service
        .start_draft(&owner, &LocationId::new("loc6"), now())
        .expect("draft");
    let saved = service
        .save(&owner, draft, SaveIntent::Draft, now())
        .expect("saves");

    match service.save(&other, saved.clone(), SaveIntent::Submit, now()) {
        Err(ReportServiceError::NotEditable(_)) => {}
        other => panic!("expected not editable, got {other:?}"),
    }
    match service.get(&other, &saved.id) {
        Err(ReportServiceError::Forbidden { .. }) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn save_rejects_scores_above_item_maximum() {
    let (service, repository, _) = build_service();
    let inspector = user(service.catalog(), "user1");

    let mut draft = service
        .start_draft(&inspector, &LocationId::new("loc1"), now())
        .expect("draft");
    draft.items[0].score = 7;

    match service.save(&inspector, draft, SaveIntent::Submit, now()) {
        Err(ReportServiceError::ScoreOutOfRange {
            item_id,
            score,
            max_score,
        }) => {
            assert_eq!(item_id, item("hr_item_1"));
            assert_eq!(score, 7);
            assert_eq!(max_score, 6);
        }
        other => panic!("expected score out of range, got {other:?}"),
    }
    assert!(repository.snapshot().expect("snapshot").is_empty());
}

#[test]
fn save_rejects_items_scored_twice() {
    let (service, repository, notifications) = build_service();
    let inspector = user(service.catalog(), "user1");

    let mut draft = service
        .start_draft(&inspector, &LocationId::new("loc1"), now())
        .expect("draft");
    let repeated = draft.items[2].clone();
    draft.items.extend(std::iter::repeat(repeated).take(20));

    match service.save(&inspector, draft, SaveIntent::Submit, now()) {
        Err(ReportServiceError::DuplicateItem(item_id)) => {
            assert_eq!(item_id, item("hr_item_3"))
        }
        other => panic!("expected duplicate item, got {other:?}"),
    }
    assert!(repository.snapshot().expect("snapshot").is_empty());
    assert!(notifications.events().is_empty());
}

#[test]
fn save_rejects_items_from_other_forms() {
    let (service, _, _) = build_service();
    let inspector = user(service.catalog(), "user1");

    let mut draft = service
        .start_draft(&inspector, &LocationId::new("loc1"), now())
        .expect("draft");
    draft.items[0].item_id = item("lr_item_1");

    match service.save(&inspector, draft, SaveIntent::Draft, now()) {
        Err(ReportServiceError::InvalidItem(item_id)) => assert_eq!(item_id, item("lr_item_1")),
        other => panic!("expected invalid item, got {other:?}"),
    }
}

#[test]
fn new_reports_are_attributed_to_the_actor() {
    let (service, _, _) = build_service();
    let inspector = user(service.catalog(), "user5");

    let mut draft = service
        .start_draft(&inspector, &LocationId::new("loc7"), now())
        .expect("draft");
    draft.inspector_id = UserId::new("user1");

    let saved = service
        .save(&inspector, draft, SaveIntent::Draft, now())
        .expect("saves");
    assert_eq!(saved.inspector_id, inspector.id);
}

#[test]
fn feedback_is_supervisor_only_and_needs_a_submitted_report() {
    let (service, _, _) = seeded_service();
    let supervisor = user(service.catalog(), "user3");
    let inspector = user(service.catalog(), "user4");

    match service.record_feedback(
        &inspector,
        &ReportId::new("report4"),
        "Looks good".to_string(),
        Some(ReportStatus::Reviewed),
    ) {
        Err(ReportServiceError::Forbidden { .. }) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }

    let reviewed = service
        .record_feedback(
            &supervisor,
            &ReportId::new("report4"),
            "Looks good".to_string(),
            Some(ReportStatus::Reviewed),
        )
        .expect("feedback recorded");
    assert_eq!(reviewed.status, ReportStatus::Reviewed);
    assert_eq!(reviewed.supervisor_comment.as_deref(), Some("Looks good"));

    match service.record_feedback(
        &supervisor,
        &ReportId::new("report4"),
        "Back to draft".to_string(),
        Some(ReportStatus::Draft),
    ) {
        Err(ReportServiceError::InvalidTransition { from, to }) => {
            assert_eq!(from, ReportStatus::Reviewed);
            assert_eq!(to, ReportStatus::Draft);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn feedback_on_drafts_is_rejected() {
    let (service, _, _) = build_service();
    let inspector = user(service.catalog(), "user1");
    let supervisor = user(service.catalog(), "user3");

    let draft = service
        .start_draft(&inspector, &LocationId::new("loc3"), now())
        .expect("draft");
    let saved = service
        .save(&inspector, draft, SaveIntent::Draft, now())
        .expect("saves");

    match service.record_feedback(&supervisor, &saved.id, "Too early".to_string(), None) {
        Err(ReportServiceError::NotSubmitted(id)) => assert_eq!(id, saved.id),
        other => panic!("expected not submitted, got {other:?}"),
    }
}

#[test]
fn inspectors_list_only_their_own_reports() {
    let (service, _, _) = seeded_service();
    let layla = user(service.catalog(), "user4");
    let supervisor = user(service.catalog(), "user3");

    let own = service.list(&layla).expect("list succeeds");
    assert_eq!(own.len(), 7);
    assert!(own.iter().all(|report| report.inspector_id == layla.id));

    assert_eq!(service.list(&supervisor).expect("list succeeds").len(), 15);
}

#[test]
fn detail_reports_score_and_editability() {
    let (service, _, _) = seeded_service();
    let supervisor = user(service.catalog(), "user3");

    let detail = service
        .detail(&supervisor, &ReportId::new("report4"))
        .expect("detail");
    assert_eq!(detail.score, 100.0);
    assert_eq!(detail.location_name.as_deref(), Some("OR 2"));
    assert_eq!(detail.zone_name.as_deref(), Some("Operating Theaters"));
    assert!(!detail.editable);
}

#[test]
fn detail_band_grades_stricter_than_the_dashboard() {
    let (service, _, _) = build_service();
    let inspector = user(service.catalog(), "user1");

    let mut draft = service
        .start_draft(&inspector, &LocationId::new("loc1"), now())
        .expect("draft");
    zero_items(&mut draft, &["hr_item_3"]);
    let saved = service
        .save(&inspector, draft, SaveIntent::Draft, now())
        .expect("draft saves");

    let detail = service.describe(&inspector, saved);
    assert_eq!(detail.score, 88.0);
    assert_eq!(detail.band, ComplianceBand::Fair);
    assert_eq!(ComplianceBand::for_score(detail.score), ComplianceBand::Good);
}

#[test]
fn dashboard_is_supervisor_only() {
    let (service, _, _) = seeded_service();
    let inspector = user(service.catalog(), "user1");
    let supervisor = user(service.catalog(), "user3");
    let mut rng = StdRng::seed_from_u64(11);

    match service.dashboard(
        &inspector,
        now().date_naive(),
        &DashboardOptions::default(),
        &mut rng,
    ) {
        Err(ReportServiceError::Forbidden { .. }) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }

    let dashboard = service
        .dashboard(
            &supervisor,
            now().date_naive(),
            &DashboardOptions::default(),
            &mut rng,
        )
        .expect("supervisor sees dashboard");
    assert_eq!(dashboard.total_inspections, 15);
}

#[test]
fn configured_seed_pins_the_forecast() {
    let (service, _, _) = seeded_service();
    let service = service.with_forecast_seed(Some(9));
    let supervisor = user(service.catalog(), "user3");

    let first = service
        .dashboard(
            &supervisor,
            now().date_naive(),
            &DashboardOptions::default(),
            &mut service.forecast_rng(None),
        )
        .expect("dashboard");
    let second = service
        .dashboard(
            &supervisor,
            now().date_naive(),
            &DashboardOptions::default(),
            &mut service.forecast_rng(None),
        )
        .expect("dashboard");

    assert_eq!(first.performance, second.performance);
}

#[test]
fn get_propagates_not_found() {
    let (service, _, _) = build_service();
    let supervisor = user(service.catalog(), "user3");

    match service.get(&supervisor, &ReportId::new("missing")) {
        Err(ReportServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn repository_outages_surface_as_errors() {
    let service = InspectionService::new(
        catalog(),
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifications::default()),
    );
    let supervisor = user(service.catalog(), "user3");

    match service.list(&supervisor) {
        Err(ReportServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert_eq!(reason, "database offline")
        }
        other => panic!("expected unavailable repository, got {other:?}"),
    }
}

#[test]
fn notification_failures_are_reported_after_saving() {
    let repository = Arc::new(MemoryRepository::default());
    let service = InspectionService::new(
        catalog(),
        repository.clone(),
        Arc::new(OfflineNotifications),
    );
    let inspector = user(service.catalog(), "user1");

    let draft = service
        .start_draft(&inspector, &LocationId::new("loc1"), now())
        .expect("draft");

    match service.save(&inspector, draft.clone(), SaveIntent::Submit, now()) {
        Err(ReportServiceError::Notification(_)) => {}
        other => panic!("expected notification error, got {other:?}"),
    }
    let stored = repository
        .fetch(&draft.id)
        .expect("fetch succeeds")
        .expect("report persisted before notifying");
    assert_eq!(stored.status, ReportStatus::Submitted);
}

#[test]
fn unknown_users_cannot_act() {
    let (service, _, _) = build_service();

    match service.actor(&UserId::new("ghost")) {
        Err(ReportServiceError::UnknownUser(id)) => assert_eq!(id, UserId::new("ghost")),
        other => panic!("expected unknown user, got {other:?}"),
    }
}
