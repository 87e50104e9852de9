//! Project endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use projectflow_domain::{
    KanbanBoard, MemberRef, NewProject, ProjectDetails, ProjectFlowError, ProjectId,
    ProjectUpdate, TaskDetails, UserId, UserSummary,
};
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::{AuthUser, JsonBody};
use crate::utils::command_helpers::execute_command;

/// Body of `add_member` / `remove_member`
#[derive(Debug, Default, Deserialize)]
pub struct MemberRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
}

impl MemberRequest {
    /// `user_id` wins when both are given.
    pub fn into_member_ref(self) -> Result<MemberRef, ProjectFlowError> {
        if let Some(id) = self.user_id {
            return Ok(MemberRef::Id(id));
        }
        match self.username.map(|name| name.trim().to_string()) {
            Some(name) if !name.is_empty() => Ok(MemberRef::Username(name)),
            _ => Err(ProjectFlowError::Validation("user_id or username is required".into())),
        }
    }
}

/// `GET /api/projects/`
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<ProjectDetails>>> {
    let projects = execute_command("projects::list", ctx.projects.list_for_user(user.id())).await?;
    Ok(Json(projects))
}

/// `POST /api/projects/`
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    JsonBody(input): JsonBody<NewProject>,
) -> ApiResult<(StatusCode, Json<ProjectDetails>)> {
    let project = execute_command("projects::create", ctx.projects.create(user.id(), input)).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// `GET /api/projects/{id}/`
pub async fn retrieve(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<ProjectDetails>> {
    let project =
        execute_command("projects::retrieve", ctx.projects.get(user.id(), project_id)).await?;
    Ok(Json(project))
}

/// `PATCH|PUT /api/projects/{id}/`
pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(project_id): Path<ProjectId>,
    JsonBody(update): JsonBody<ProjectUpdate>,
) -> ApiResult<Json<ProjectDetails>> {
    let project =
        execute_command("projects::update", ctx.projects.update(user.id(), project_id, update))
            .await?;
    Ok(Json(project))
}

/// `DELETE /api/projects/{id}/`
pub async fn destroy(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<StatusCode> {
    execute_command("projects::destroy", ctx.projects.delete(user.id(), project_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/projects/{id}/add_member/`
pub async fn add_member(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(project_id): Path<ProjectId>,
    JsonBody(request): JsonBody<MemberRequest>,
) -> ApiResult<Json<ProjectDetails>> {
    let project = execute_command("projects::add_member", async {
        let target = request.into_member_ref()?;
        ctx.projects.add_member(user.id(), project_id, target).await
    })
    .await?;
    Ok(Json(project))
}

/// `POST /api/projects/{id}/remove_member/`
pub async fn remove_member(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(project_id): Path<ProjectId>,
    JsonBody(request): JsonBody<MemberRequest>,
) -> ApiResult<Json<ProjectDetails>> {
    let project = execute_command("projects::remove_member", async {
        let target = request.into_member_ref()?;
        ctx.projects.remove_member(user.id(), project_id, target).await
    })
    .await?;
    Ok(Json(project))
}

/// `GET /api/projects/{id}/kanban/`
pub async fn kanban(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<KanbanBoard>> {
    let board =
        execute_command("projects::kanban", ctx.projects.kanban(user.id(), project_id)).await?;
    Ok(Json(board))
}

/// `GET /api/projects/{id}/tasks/`
pub async fn tasks(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<TaskDetails>>> {
    let tasks =
        execute_command("projects::tasks", ctx.projects.tasks(user.id(), project_id)).await?;
    Ok(Json(tasks))
}

/// `GET /api/projects/all_users/`
pub async fn all_users(
    State(ctx): State<Arc<AppContext>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = execute_command("projects::all_users", ctx.projects.all_users()).await?;
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_request_prefers_user_id() {
        let request = MemberRequest { user_id: Some(4), username: Some("bob".into()) };
        assert_eq!(request.into_member_ref().unwrap(), MemberRef::Id(4));
    }

    #[test]
    fn member_request_falls_back_to_username() {
        let request = MemberRequest { user_id: None, username: Some(" bob ".into()) };
        assert_eq!(request.into_member_ref().unwrap(), MemberRef::Username("bob".into()));
    }

    #[test]
    fn empty_member_request_is_rejected() {
        let request = MemberRequest { user_id: None, username: Some("  ".into()) };
        assert!(matches!(request.into_member_ref(), Err(ProjectFlowError::Validation(_))));
        assert!(matches!(
            MemberRequest::default().into_member_ref(),
            Err(ProjectFlowError::Validation(_))
        ));
    }
}
