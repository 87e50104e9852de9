//! Membership checks shared by the services.
//!
//! Reads hide projects from non-members (`NotFound`); mutations by a
//! non-member on a project they could name are `Permission` errors.

use projectflow_domain::{Project, ProjectFlowError, ProjectId, Result, Task, TaskId, UserId};

use crate::projects::ports::ProjectRepository;
use crate::tasks::ports::TaskRepository;

pub(crate) async fn load_project(
    projects: &dyn ProjectRepository,
    project_id: ProjectId,
) -> Result<Project> {
    projects
        .get_by_id(project_id)
        .await?
        .ok_or_else(|| ProjectFlowError::NotFound(format!("Project {} not found", project_id)))
}

/// Project `user_id` may read.
pub(crate) async fn visible_project(
    projects: &dyn ProjectRepository,
    user_id: UserId,
    project_id: ProjectId,
) -> Result<Project> {
    let project = load_project(projects, project_id).await?;
    if project.is_member(user_id) {
        Ok(project)
    } else {
        Err(ProjectFlowError::NotFound(format!("Project {} not found", project_id)))
    }
}

pub(crate) fn require_member(project: &Project, user_id: UserId) -> Result<()> {
    if project.is_member(user_id) {
        Ok(())
    } else {
        Err(ProjectFlowError::Permission("You are not a member of this project".into()))
    }
}

pub(crate) fn require_creator(project: &Project, user_id: UserId, action: &str) -> Result<()> {
    if project.is_creator(user_id) {
        Ok(())
    } else {
        Err(ProjectFlowError::Permission(format!("Only the project creator can {}", action)))
    }
}

/// Task `user_id` may see, with its owning project.
pub(crate) async fn visible_task(
    tasks: &dyn TaskRepository,
    projects: &dyn ProjectRepository,
    user_id: UserId,
    task_id: TaskId,
) -> Result<(Task, Project)> {
    let not_found = || ProjectFlowError::NotFound(format!("Task {} not found", task_id));

    let task = tasks.get_by_id(task_id).await?.ok_or_else(not_found)?;
    let project = projects.get_by_id(task.project_id).await?.ok_or_else(not_found)?;
    if !project.is_member(user_id) {
        return Err(not_found());
    }
    Ok((task, project))
}
