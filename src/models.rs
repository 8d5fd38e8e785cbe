use chrono::NaiveDate;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Workflow state of a task.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::OnHold,
        TaskStatus::Cancelled,
    ];

    /// Wire name, e.g. `in-progress`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::OnHold => "on-hold",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<TaskStatus> {
        TaskStatus::ALL.into_iter().find(|st| st.as_str() == s.trim().to_lowercase())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        Priority::ALL.into_iter().find(|p| p.as_str() == s.trim().to_lowercase())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneCategory {
    #[default]
    Planning,
    Construction,
    Inspection,
    Payment,
    Delivery,
}

impl MilestoneCategory {
    pub const ALL: [MilestoneCategory; 5] = [
        MilestoneCategory::Planning,
        MilestoneCategory::Construction,
        MilestoneCategory::Inspection,
        MilestoneCategory::Payment,
        MilestoneCategory::Delivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneCategory::Planning => "planning",
            MilestoneCategory::Construction => "construction",
            MilestoneCategory::Inspection => "inspection",
            MilestoneCategory::Payment => "payment",
            MilestoneCategory::Delivery => "delivery",
        }
    }

    pub fn parse(s: &str) -> Option<MilestoneCategory> {
        MilestoneCategory::ALL.into_iter().find(|c| c.as_str() == s.trim().to_lowercase())
    }
}

/// Client embedded in a property record. Only the name is displayed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ClientRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// A property (job site) that tasks and milestones are attached to.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Property {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "lenient")]
    pub client: Option<ClientRef>,
}

/// How a record points at its property: either the bare id or the
/// populated document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PropertyRef {
    Id(String),
    Populated(Property),
}

impl PropertyRef {
    pub fn id(&self) -> &str {
        match self {
            PropertyRef::Id(id) => id,
            PropertyRef::Populated(p) => &p.id,
        }
    }
}

/// A unit of scheduled work as returned by the API.
///
/// Date fields are kept as raw JSON values; every consumer goes through
/// [`crate::normalize::normalize_date`] to read them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Value,
    #[serde(default)]
    pub end_date: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub priority: Priority,
    /// Completion percentage; absent means 0.
    #[serde(default, deserialize_with = "lenient")]
    pub progress: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub property: Option<PropertyRef>,
}

/// A single-date significant event on a property.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub category: MilestoneCategory,
    #[serde(default, deserialize_with = "lenient")]
    pub is_completed: bool,
    /// Days before the date at which the back office sends a reminder.
    #[serde(default, deserialize_with = "lenient")]
    pub notify_before: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub property: Option<PropertyRef>,
}

/// Body sent when creating or updating a task.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub property: String,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: TaskStatus,
    pub priority: Priority,
    pub progress: u8,
}

/// Body sent when creating or updating a milestone.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDraft {
    pub property: String,
    pub title: String,
    pub date: NaiveDate,
    pub category: MilestoneCategory,
    pub notify_before: u32,
}

pub const DEFAULT_NOTIFY_BEFORE: u32 = 7;

impl TaskDraft {
    /// Prefills a draft from an existing task, as the edit form does.
    pub fn from_task(task: &Task) -> Option<TaskDraft> {
        TaskDraft::from_task_or(task, None, None)
    }

    /// Like [`TaskDraft::from_task`], taking `start` and `end` where the
    /// stored dates are unusable. Every other field comes from the task.
    pub fn from_task_or(task: &Task, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<TaskDraft> {
        Some(TaskDraft {
            property: property_id(&task.property),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            start_date: stored_day(&task.start_date).or(start)?,
            end_date: stored_day(&task.end_date).or(end)?,
            status: task.status,
            priority: task.priority,
            progress: task.progress.unwrap_or(0).clamp(0, 100) as u8,
        })
    }
}

impl MilestoneDraft {
    pub fn from_milestone(milestone: &Milestone) -> Option<MilestoneDraft> {
        MilestoneDraft::from_milestone_or(milestone, None)
    }

    /// Like [`MilestoneDraft::from_milestone`], taking `date` when the stored
    /// one is unusable.
    pub fn from_milestone_or(milestone: &Milestone, date: Option<NaiveDate>) -> Option<MilestoneDraft> {
        Some(MilestoneDraft {
            property: property_id(&milestone.property),
            title: milestone.title.clone(),
            date: stored_day(&milestone.date).or(date)?,
            category: milestone.category,
            notify_before: milestone
                .notify_before
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_NOTIFY_BEFORE),
        })
    }
}

fn property_id(property: &Option<PropertyRef>) -> String {
    property.as_ref().map(|p| p.id().to_string()).unwrap_or_default()
}

/// Calendar day of a stored date value.
pub(crate) fn stored_day(value: &Value) -> Option<NaiveDate> {
    crate::normalize::normalize_date(value).map(|d| d.date_naive())
}

/// Deserializes a field, falling back to its default when the upstream value
/// has an unexpected shape instead of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
