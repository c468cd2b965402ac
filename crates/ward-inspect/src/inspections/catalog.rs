use super::compliance::FormResolver;
use super::domain::{
    EvaluationItem, FormId, InspectionForm, InspectionReport, InspectionResultItem, ItemId,
    Location, LocationId, ReportId, ReportStatus, RiskCategory, User, UserId, UserRole, Zone,
    ZoneId,
};
use chrono::{DateTime, Duration, Utc};

const DEFECT_KEYS: [&str; 5] = [
    "defect_dust",
    "defect_stains",
    "defect_rust",
    "defect_needs_cleaning",
    "defect_needs_maintenance",
];

const HIGH_RISK_MAX_SCORES: [u32; 15] = [6, 6, 12, 12, 6, 5, 6, 7, 10, 7, 5, 4, 5, 5, 4];
const MEDIUM_RISK_MAX_SCORES: [u32; 16] = [3, 6, 6, 4, 10, 7, 5, 6, 6, 10, 9, 7, 5, 4, 5, 4];
const LOW_RISK_MAX_SCORES: [u32; 15] = [6, 10, 8, 4, 10, 7, 5, 7, 7, 6, 6, 5, 10, 5, 4];

/// Reference data the inspection workflow reads but never mutates: users,
/// zones, locations and the risk-tiered forms.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    users: Vec<User>,
    zones: Vec<Zone>,
    locations: Vec<Location>,
    forms: Vec<InspectionForm>,
}

impl ReferenceCatalog {
    pub fn new(
        users: Vec<User>,
        zones: Vec<Zone>,
        locations: Vec<Location>,
        forms: Vec<InspectionForm>,
    ) -> Self {
        Self {
            users,
            zones,
            locations,
            forms,
        }
    }

    /// The hospital catalog used by the demo service.
    pub fn standard() -> Self {
        let users = vec![
            user("user1", "Mohammed Ali", UserRole::Inspector),
            user("user2", "Fatima Saad", UserRole::Inspector),
            user("user4", "Layla Alotaibi", UserRole::Inspector),
            user("user5", "Khalid Alghamdi", UserRole::Inspector),
            user("user3", "Manager Ahmed", UserRole::Supervisor),
        ];

        let zones = vec![
            zone("zone1", "Operating Theaters", RiskCategory::High),
            zone("zone2", "Emergency Department", RiskCategory::Medium),
            zone("zone3", "Administrative Offices", RiskCategory::Low),
        ];

        let forms = vec![
            form(
                "form1",
                "High-Risk Area Inspection Form",
                "hr_item",
                &HIGH_RISK_MAX_SCORES,
            ),
            form(
                "form2",
                "Medium-Risk Area Inspection Form",
                "mr_item",
                &MEDIUM_RISK_MAX_SCORES,
            ),
            form(
                "form3",
                "Low-Risk Area Inspection Form",
                "lr_item",
                &LOW_RISK_MAX_SCORES,
            ),
        ];

        let locations = vec![
            location("loc1", "OR 1", "zone1", "form1"),
            location("loc2", "OR 2", "zone1", "form1"),
            location("loc3", "ICU", "zone1", "form1"),
            location("loc4", "ER Triage", "zone2", "form2"),
            location("loc5", "ER Ward A", "zone2", "form2"),
            location("loc6", "HR Office", "zone3", "form3"),
            location("loc7", "Main Lobby", "zone3", "form3"),
        ];

        Self::new(users, zones, locations, forms)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn forms(&self) -> &[InspectionForm] {
        &self.forms
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.iter().find(|location| &location.id == id)
    }

    pub fn form(&self, id: &FormId) -> Option<&InspectionForm> {
        self.forms.iter().find(|form| &form.id == id)
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| &zone.id == id)
    }

    pub fn zone_for_location(&self, id: &LocationId) -> Option<&Zone> {
        self.location(id).and_then(|location| self.zone(&location.zone_id))
    }

    /// Users with the inspector role, in catalog order.
    pub fn inspectors(&self) -> Vec<User> {
        self.users
            .iter()
            .filter(|user| user.is_inspector())
            .cloned()
            .collect()
    }

    /// Locations whose zone carries the given risk category.
    pub fn locations_for_risk(&self, risk: RiskCategory) -> Vec<&Location> {
        self.locations
            .iter()
            .filter(|location| {
                self.zone(&location.zone_id)
                    .map(|zone| zone.risk_category == risk)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Report history seeded relative to `now` so dashboards have data to show.
    pub fn sample_reports(&self, now: DateTime<Utc>) -> Vec<InspectionReport> {
        SAMPLE_REPORTS
            .iter()
            .filter_map(|sample| self.materialize(sample, now))
            .collect()
    }

    fn materialize(&self, sample: &SampleReport, now: DateTime<Utc>) -> Option<InspectionReport> {
        let location_id = LocationId::new(sample.location);
        let form = self.form_for_location(&location_id)?;
        let items = form
            .items
            .iter()
            .map(|item| {
                let mut result = InspectionResultItem::full_marks(item);
                match sample.finding {
                    Some(finding) if finding.item == item.id.as_str() => {
                        result.score = finding.score.min(item.max_score);
                        result.comment = finding.comment.to_string();
                        result.defects = vec![finding.defect.to_string()];
                    }
                    _ => {
                        result.score = item.max_score.saturating_sub(sample.deduction);
                        if let Some(note) = sample.note {
                            result.comment = note.to_string();
                            result.defects = vec!["defect_dust".to_string()];
                        }
                    }
                }
                result
            })
            .collect();

        Some(InspectionReport {
            id: ReportId::new(format!("report{}", sample.number)),
            reference_number: format!("INSP-2024-{:03}", sample.number),
            inspector_id: UserId::new(sample.inspector),
            location_id,
            date: now - Duration::days(sample.days_ago),
            status: sample.status,
            items,
            supervisor_comment: sample.supervisor_comment.map(str::to_string),
        })
    }
}

impl FormResolver for ReferenceCatalog {
    fn form_for_location(&self, location_id: &LocationId) -> Option<&InspectionForm> {
        self.location(location_id)
            .and_then(|location| self.form(&location.form_id))
    }
}

fn user(id: &str, name: &str, role: UserRole) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        role,
    }
}

fn zone(id: &str, name: &str, risk_category: RiskCategory) -> Zone {
    Zone {
        id: ZoneId::new(id),
        name: name.to_string(),
        risk_category,
    }
}

fn location(id: &str, name: &str, zone_id: &str, form_id: &str) -> Location {
    Location {
        id: LocationId::new(id),
        name: name.to_string(),
        zone_id: ZoneId::new(zone_id),
        form_id: FormId::new(form_id),
    }
}

fn form(id: &str, name: &str, item_prefix: &str, max_scores: &[u32]) -> InspectionForm {
    let items = max_scores
        .iter()
        .enumerate()
        .map(|(index, max_score)| {
            let key = format!("{item_prefix}_{}", index + 1);
            EvaluationItem {
                id: ItemId::new(key.clone()),
                name: key,
                max_score: *max_score,
                predefined_defects: DEFECT_KEYS.iter().map(|key| key.to_string()).collect(),
            }
        })
        .collect();

    InspectionForm {
        id: FormId::new(id),
        name: name.to_string(),
        items,
    }
}

#[derive(Clone, Copy)]
struct Finding {
    item: &'static str,
    score: u32,
    comment: &'static str,
    defect: &'static str,
}

struct SampleReport {
    number: u32,
    inspector: &'static str,
    location: &'static str,
    days_ago: i64,
    status: ReportStatus,
    deduction: u32,
    note: Option<&'static str>,
    finding: Option<Finding>,
    supervisor_comment: Option<&'static str>,
}

const SAMPLE_REPORTS: [SampleReport; 15] = [
    SampleReport {
        number: 1,
        inspector: "user1",
        location: "loc1",
        days_ago: 15,
        status: ReportStatus::Reviewed,
        deduction: 1,
        note: None,
        finding: Some(Finding {
            item: "hr_item_14",
            score: 3,
            comment: "One bottle was not labeled correctly.",
            defect: "defect_needs_maintenance",
        }),
        supervisor_comment: Some("Good work, but pay more attention to chemical storage."),
    },
    SampleReport {
        number: 2,
        inspector: "user2",
        location: "loc4",
        days_ago: 20,
        status: ReportStatus::NeedsAction,
        deduction: 1,
        note: None,
        finding: Some(Finding {
            item: "mr_item_8",
            score: 3,
            comment: "General waste bin was overflowing.",
            defect: "defect_needs_cleaning",
        }),
        supervisor_comment: Some("Please address the waste disposal issue immediately."),
    },
    SampleReport {
        number: 4,
        inspector: "user4",
        location: "loc2",
        days_ago: 1,
        status: ReportStatus::Submitted,
        deduction: 0,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 5,
        inspector: "user4",
        location: "loc5",
        days_ago: 3,
        status: ReportStatus::Reviewed,
        deduction: 0,
        note: None,
        finding: None,
        supervisor_comment: Some("Outstanding work, Layla. A model report."),
    },
    SampleReport {
        number: 6,
        inspector: "user4",
        location: "loc7",
        days_ago: 4,
        status: ReportStatus::Reviewed,
        deduction: 1,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 7,
        inspector: "user4",
        location: "loc3",
        days_ago: 2,
        status: ReportStatus::Reviewed,
        deduction: 0,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 8,
        inspector: "user4",
        location: "loc4",
        days_ago: 5,
        status: ReportStatus::Reviewed,
        deduction: 1,
        note: Some("Minor dust found"),
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 9,
        inspector: "user4",
        location: "loc1",
        days_ago: 8,
        status: ReportStatus::Reviewed,
        deduction: 0,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 10,
        inspector: "user4",
        location: "loc6",
        days_ago: 10,
        status: ReportStatus::Reviewed,
        deduction: 0,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 11,
        inspector: "user1",
        location: "loc5",
        days_ago: 12,
        status: ReportStatus::Reviewed,
        deduction: 2,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 12,
        inspector: "user1",
        location: "loc7",
        days_ago: 18,
        status: ReportStatus::Reviewed,
        deduction: 1,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 13,
        inspector: "user2",
        location: "loc2",
        days_ago: 22,
        status: ReportStatus::NeedsAction,
        deduction: 1,
        note: None,
        finding: Some(Finding {
            item: "hr_item_9",
            score: 2,
            comment: "Medical waste bin not sealed properly.",
            defect: "defect_needs_maintenance",
        }),
        supervisor_comment: Some("Critical issue with waste disposal. Re-inspection required."),
    },
    SampleReport {
        number: 14,
        inspector: "user2",
        location: "loc6",
        days_ago: 25,
        status: ReportStatus::Reviewed,
        deduction: 1,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 15,
        inspector: "user5",
        location: "loc4",
        days_ago: 6,
        status: ReportStatus::Submitted,
        deduction: 2,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
    SampleReport {
        number: 16,
        inspector: "user5",
        location: "loc3",
        days_ago: 14,
        status: ReportStatus::Reviewed,
        deduction: 1,
        note: None,
        finding: None,
        supervisor_comment: None,
    },
];
