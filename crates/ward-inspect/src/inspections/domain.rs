use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Identifier wrapper for application users.
    UserId
);
identifier!(
    /// Identifier wrapper for hospital zones.
    ZoneId
);
identifier!(
    /// Identifier wrapper for inspected locations.
    LocationId
);
identifier!(
    /// Identifier wrapper for inspection forms.
    FormId
);
identifier!(
    /// Identifier wrapper for a single evaluation item on a form.
    ItemId
);
identifier!(
    /// Identifier wrapper for inspection reports.
    ReportId
);
identifier!(NotificationId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Inspector,
    Supervisor,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inspector => "Inspector",
            Self::Supervisor => "Supervisor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: UserRole,
}

impl User {
    pub fn is_inspector(&self) -> bool {
        self.role == UserRole::Inspector
    }

    pub fn is_supervisor(&self) -> bool {
        self.role == UserRole::Supervisor
    }
}

/// Risk tier of a zone; decides which inspection form its locations use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    High,
    Medium,
    Low,
}

impl RiskCategory {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub risk_category: RiskCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub zone_id: ZoneId,
    pub form_id: FormId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub id: ItemId,
    pub name: String,
    pub max_score: u32,
    pub predefined_defects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionForm {
    pub id: FormId,
    pub name: String,
    pub items: Vec<EvaluationItem>,
}

impl InspectionForm {
    /// Total points available on the form.
    pub fn max_total(&self) -> u32 {
        self.items.iter().map(|item| item.max_score).sum()
    }

    pub fn item(&self, id: &ItemId) -> Option<&EvaluationItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionResultItem {
    pub item_id: ItemId,
    pub score: u32,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub defects: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl InspectionResultItem {
    /// Result row for a freshly opened form: full marks, nothing recorded.
    pub fn full_marks(item: &EvaluationItem) -> Self {
        Self {
            item_id: item.id.clone(),
            score: item.max_score,
            comment: String::new(),
            defects: Vec::new(),
            photos: Vec::new(),
        }
    }
}

/// Lifecycle of a report: `Draft -> Submitted -> {Reviewed, NeedsAction}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Reviewed,
    NeedsAction,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Reviewed => "Reviewed",
            Self::NeedsAction => "Needs Corrective Action",
        }
    }

    /// Whether a supervisor may move a report from `self` into `next`.
    pub fn can_review_into(self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (
                Self::Submitted | Self::Reviewed | Self::NeedsAction,
                Self::Reviewed | Self::NeedsAction
            )
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub id: ReportId,
    pub reference_number: String,
    pub inspector_id: UserId,
    pub location_id: LocationId,
    pub date: DateTime<Utc>,
    pub status: ReportStatus,
    pub items: Vec<InspectionResultItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_comment: Option<String>,
}

impl InspectionReport {
    /// Sum of the scores recorded on the report.
    pub fn achieved_total(&self) -> u32 {
        self.items.iter().map(|item| item.score).sum()
    }

    /// Edit rights: new reports are always editable, stored ones only while
    /// they are drafts owned by the acting inspector.
    pub fn is_editable_by(&self, actor: &User, is_new: bool) -> bool {
        is_new || (self.status == ReportStatus::Draft && self.inspector_id == actor.id)
    }
}
