//! Project entity, membership rules and project read models

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{TaskDetails, TaskStatus};
use super::user::{User, UserSummary};
use super::{ProjectId, UserId};

/// A named container of tasks with a membership set
///
/// `created_by` is always an element of `members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub members: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    pub fn is_creator(&self, user_id: UserId) -> bool {
        self.created_by == user_id
    }

    /// Replace the membership set wholesale, keeping the creator.
    pub fn replace_members(&mut self, member_ids: impl IntoIterator<Item = UserId>) {
        self.members = member_ids.into_iter().collect();
        self.members.insert(self.created_by);
    }
}

/// Input for project creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub member_ids: Vec<UserId>,
}

/// Partial update of a project; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub member_ids: Option<Vec<UserId>>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.member_ids.is_none()
    }
}

/// Target of an add/remove-member request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef {
    Id(UserId),
    Username(String),
}

impl std::fmt::Display for MemberRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {}", id),
            Self::Username(username) => write!(f, "username '{}'", username),
        }
    }
}

/// Share of completed tasks, rounded down; 0 for an empty project.
pub fn progress_percentage(completed: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    u32::try_from(completed.min(total) * 100 / total).unwrap_or(100)
}

/// Project as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub created_by: UserSummary,
    pub members: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub task_count: u64,
    pub progress_percentage: u32,
}

impl ProjectDetails {
    /// `members` should already be resolved from `project.members`.
    pub fn new(
        project: &Project,
        creator: &User,
        members: &[User],
        task_count: u64,
        completed_count: u64,
    ) -> Self {
        let mut members: Vec<UserSummary> = members.iter().map(UserSummary::from).collect();
        members.sort_by(|a, b| a.username.cmp(&b.username));
        Self {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            created_by: creator.summary(),
            members,
            created_at: project.created_at,
            updated_at: project.updated_at,
            task_count,
            progress_percentage: progress_percentage(completed_count, task_count),
        }
    }
}

/// One status column of the kanban board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanColumn {
    pub name: String,
    pub tasks: Vec<TaskDetails>,
}

/// Tasks grouped by status; every status is present, even when empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KanbanBoard(pub BTreeMap<TaskStatus, KanbanColumn>);

impl KanbanBoard {
    /// Group `tasks` into the fixed status columns.
    pub fn from_tasks(tasks: impl IntoIterator<Item = TaskDetails>) -> Self {
        let mut columns: BTreeMap<TaskStatus, KanbanColumn> = TaskStatus::ALL
            .iter()
            .map(|status| {
                (*status, KanbanColumn { name: status.display_name().to_string(), tasks: Vec::new() })
            })
            .collect();

        for task in tasks {
            if let Some(column) = columns.get_mut(&task.status) {
                column.tasks.push(task);
            }
        }

        Self(columns)
    }

    pub fn column(&self, status: TaskStatus) -> Option<&KanbanColumn> {
        self.0.get(&status)
    }

    pub fn task_count(&self) -> usize {
        self.0.values().map(|column| column.tasks.len()).sum()
    }
}
