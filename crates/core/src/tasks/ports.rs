//! Port interfaces for task persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use projectflow_domain::{
    ProjectId, Result, Task, TaskId, TaskPriority, TaskStatus, UserId,
};

/// Fields for a task insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: ProjectId,
    pub assignee_id: Option<UserId>,
    pub created_by: UserId,
    pub due_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, draft: TaskDraft) -> Result<Task>;

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>>;

    /// Tasks of every project `user_id` is a member of, newest first.
    async fn list_visible_to(&self, user_id: UserId) -> Result<Vec<Task>>;

    /// Newest first.
    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Task>>;

    /// Persist the mutable fields (title, description, status, priority,
    /// assignee, due date). Project and creator never change.
    async fn update(&self, task: &Task) -> Result<Task>;

    async fn set_calendar_event_id(&self, task_id: TaskId, event_id: &str) -> Result<()>;

    /// Delete the task and its comments in one transaction.
    async fn delete_cascade(&self, task_id: TaskId) -> Result<()>;

    /// Tasks assigned to `user_id`, optionally only those in `status`.
    async fn count_assigned(&self, user_id: UserId, status: Option<TaskStatus>) -> Result<u64>;
}
