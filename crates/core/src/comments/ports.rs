//! Port interface for comment persistence

use async_trait::async_trait;
use projectflow_domain::{Comment, Result, TaskId, UserId};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, task_id: TaskId, author_id: UserId, text: &str) -> Result<Comment>;

    /// Oldest first.
    async fn list_for_task(&self, task_id: TaskId) -> Result<Vec<Comment>>;

    async fn count_for_task(&self, task_id: TaskId) -> Result<u64>;
}
