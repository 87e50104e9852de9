//! Comments on tasks.

pub mod ports;

use std::sync::Arc;

use projectflow_common::validation::{StringValidator, ValidationError};
use projectflow_domain::{CommentDetails, ProjectFlowError, Result, TaskId, UserId};
use tracing::debug;

use self::ports::CommentRepository;
use crate::access::visible_task;
use crate::accounts::ports::UserRepository;
use crate::details::DetailsBuilder;
use crate::projects::ports::ProjectRepository;
use crate::tasks::ports::TaskRepository;

/// Comment service: anyone who can see a task may read and add comments
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    details: DetailsBuilder,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        tasks: Arc<dyn TaskRepository>,
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        let details =
            DetailsBuilder::new(users, projects.clone(), tasks.clone(), comments.clone());
        Self { comments, tasks, projects, details }
    }

    /// Comments of a visible task, oldest first.
    pub async fn list(&self, user_id: UserId, task_id: TaskId) -> Result<Vec<CommentDetails>> {
        let (task, _) =
            visible_task(self.tasks.as_ref(), self.projects.as_ref(), user_id, task_id).await?;
        let comments = self.comments.list_for_task(task.id).await?;
        self.details.comments(&comments).await
    }

    pub async fn add(&self, user_id: UserId, task_id: TaskId, text: &str) -> Result<CommentDetails> {
        let mut errors = ValidationError::new();
        errors.check("text", text, &StringValidator::new().not_empty());
        errors.into_result().map_err(|e| ProjectFlowError::Validation(e.to_string()))?;

        let (task, _) =
            visible_task(self.tasks.as_ref(), self.projects.as_ref(), user_id, task_id).await?;
        let comment = self.comments.create(task.id, user_id, text).await?;
        debug!(comment_id = comment.id, task_id, "Comment added");

        let mut details = self.details.comments(std::slice::from_ref(&comment)).await?;
        details.pop().ok_or_else(|| ProjectFlowError::Internal("Comment vanished".into()))
    }
}
