//! Task service - visibility, validation and transitions

use std::sync::Arc;

use projectflow_common::validation::{StringValidator, ValidationError};
use projectflow_domain::constants::MAX_TASK_TITLE_LENGTH;
use projectflow_domain::{
    NewTask, Project, ProjectFlowError, Result, TaskDetails, TaskId, TaskPriority, TaskStatus,
    TaskUpdate, UserId,
};
use tracing::info;

use super::ports::{TaskDraft, TaskRepository};
use super::query::TaskQuery;
use crate::access::visible_task;
use crate::accounts::ports::UserRepository;
use crate::comments::ports::CommentRepository;
use crate::details::DetailsBuilder;
use crate::projects::ports::ProjectRepository;

/// Task service
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    details: DetailsBuilder,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        let details = DetailsBuilder::new(users, projects.clone(), tasks.clone(), comments);
        Self { tasks, projects, details }
    }

    /// Visible tasks narrowed by `query`.
    pub async fn list(&self, user_id: UserId, query: &TaskQuery) -> Result<Vec<TaskDetails>> {
        let visible = self.tasks.list_visible_to(user_id).await?;
        let tasks = query.apply(visible, user_id);
        self.details.tasks(&tasks).await
    }

    pub async fn get(&self, user_id: UserId, task_id: TaskId) -> Result<TaskDetails> {
        let (task, _) = visible_task(self.tasks.as_ref(), self.projects.as_ref(), user_id, task_id)
            .await?;
        self.details.task(&task).await
    }

    /// Create a task in a project the caller belongs to.
    ///
    /// The creator is always the caller. An assignee must be a project member.
    pub async fn create(&self, user_id: UserId, input: NewTask) -> Result<TaskDetails> {
        let title = validate_title(&input.title)?;

        let project = self.projects.get_by_id(input.project_id).await?.ok_or_else(|| {
            ProjectFlowError::Validation(format!("project: Project {} does not exist", input.project_id))
        })?;
        if !project.is_member(user_id) {
            return Err(ProjectFlowError::Validation(
                "project: You are not a member of this project".into(),
            ));
        }
        if let Some(assignee_id) = input.assignee_id {
            validate_assignee(&project, assignee_id)?;
        }

        let task = self
            .tasks
            .create(TaskDraft {
                title,
                description: input.description,
                status: input.status,
                priority: input.priority,
                project_id: project.id,
                assignee_id: input.assignee_id,
                created_by: user_id,
                due_date: input.due_date,
            })
            .await?;

        info!(task_id = task.id, project_id = project.id, user_id, "Task created");
        self.details.task(&task).await
    }

    /// Apply a partial update. The owning project never changes.
    pub async fn update(
        &self,
        user_id: UserId,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> Result<TaskDetails> {
        let (mut task, project) =
            visible_task(self.tasks.as_ref(), self.projects.as_ref(), user_id, task_id).await?;

        if let Some(title) = update.title {
            task.title = validate_title(&title)?;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(assignee_id) = update.assignee_id {
            if let Some(id) = assignee_id {
                validate_assignee(&project, id)?;
            }
            task.assignee_id = assignee_id;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }

        let task = self.tasks.update(&task).await?;
        self.details.task(&task).await
    }

    /// Move a task to any status.
    pub async fn update_status(
        &self,
        user_id: UserId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<TaskDetails> {
        self.update(user_id, task_id, TaskUpdate { status: Some(status), ..TaskUpdate::default() })
            .await
    }

    pub async fn update_priority(
        &self,
        user_id: UserId,
        task_id: TaskId,
        priority: TaskPriority,
    ) -> Result<TaskDetails> {
        self.update(
            user_id,
            task_id,
            TaskUpdate { priority: Some(priority), ..TaskUpdate::default() },
        )
        .await
    }

    /// Delete a visible task together with its comments.
    pub async fn delete(&self, user_id: UserId, task_id: TaskId) -> Result<()> {
        let (task, _) =
            visible_task(self.tasks.as_ref(), self.projects.as_ref(), user_id, task_id).await?;
        self.tasks.delete_cascade(task.id).await?;
        info!(task_id, user_id, "Task deleted");
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<String> {
    let mut errors = ValidationError::new();
    errors.check("title", title, &StringValidator::new().not_empty().max_length(MAX_TASK_TITLE_LENGTH));
    errors.into_result().map_err(|e| ProjectFlowError::Validation(e.to_string()))?;
    Ok(title.trim().to_string())
}

fn validate_assignee(project: &Project, assignee_id: UserId) -> Result<()> {
    if project.is_member(assignee_id) {
        Ok(())
    } else {
        Err(ProjectFlowError::Validation(
            "assignee_id: The assignee must be a member of the project".into(),
        ))
    }
}
