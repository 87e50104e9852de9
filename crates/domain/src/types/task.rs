//! Task entity, its status/priority enumerations and the task read model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::user::{User, UserSummary};
use super::{ProjectId, TaskId, UserId};
use crate::impl_domain_enum_conversions;

/// Kanban column a task sits in
///
/// Transitions are unconstrained: any status may follow any other.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    InReview,
    Done,
}

impl_domain_enum_conversions!(TaskStatus {
    New => ("new", "New"),
    InProgress => ("in_progress", "In Progress"),
    InReview => ("in_review", "In Review"),
    Done => ("done", "Done"),
});

/// Task priority, most urgent first
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    None,
}

impl_domain_enum_conversions!(TaskPriority {
    Critical => ("critical", "Critical"),
    High => ("high", "High"),
    Medium => ("medium", "Medium"),
    Low => ("low", "Low"),
    None => ("none", "No priority"),
});

/// Unit of work scoped to one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: ProjectId,
    pub assignee_id: Option<UserId>,
    pub created_by: UserId,
    pub due_date: Option<DateTime<Utc>>,
    pub calendar_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Due date set, not done, and already past `now`.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => self.status != TaskStatus::Done && due < now,
            None => false,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }
}

/// Input for task creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(alias = "project")]
    pub project_id: ProjectId,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial task update
///
/// For `assignee_id` and `due_date` the outer `Option` is "field present",
/// the inner one is the nullable value, so `null` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "present_field")]
    pub assignee_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "present_field")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Task as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub status_display: String,
    pub priority: TaskPriority,
    pub priority_display: String,
    pub project: ProjectId,
    pub project_name: String,
    pub assignee: Option<UserSummary>,
    pub created_by: UserSummary,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub calendar_event_id: Option<String>,
    pub is_overdue: bool,
    pub comments_count: u64,
}

impl TaskDetails {
    pub fn new(
        task: &Task,
        project_name: &str,
        assignee: Option<&User>,
        creator: &User,
        comments_count: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            status_display: task.status.display_name().to_string(),
            priority: task.priority,
            priority_display: task.priority.display_name().to_string(),
            project: task.project_id,
            project_name: project_name.to_string(),
            assignee: assignee.map(UserSummary::from),
            created_by: creator.summary(),
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
            calendar_event_id: task.calendar_event_id.clone(),
            is_overdue: task.is_overdue_at(now),
            comments_count,
        }
    }
}
