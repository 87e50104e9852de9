//! Task endpoints, comments and the calendar sync action

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use projectflow_core::TaskQuery;
use projectflow_domain::{
    CommentDetails, NewTask, ProjectFlowError, ProjectId, SyncAction, SyncOutcome, TaskDetails,
    TaskId, TaskPriority, TaskStatus, TaskUpdate,
};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::{AuthUser, JsonBody, QueryParams};
use crate::utils::command_helpers::execute_command;
use crate::utils::session_cookie::{append_session_cookie, session_cookie};

/// Raw list filters as they appear in the query string
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub project: Option<ProjectId>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to_me: Option<String>,
    pub created_by_me: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl TaskListParams {
    pub fn into_query(self) -> Result<TaskQuery, ProjectFlowError> {
        Ok(TaskQuery {
            project: self.project,
            status: parse_opt::<TaskStatus>(self.status.as_deref())?,
            priority: parse_opt::<TaskPriority>(self.priority.as_deref())?,
            assigned_to_me: is_set(self.assigned_to_me.as_deref()),
            created_by_me: is_set(self.created_by_me.as_deref()),
            search: self.search,
            ordering: parse_opt(self.ordering.as_deref())?.unwrap_or_default(),
        })
    }
}

fn parse_opt<T: FromStr<Err = String>>(value: Option<&str>) -> Result<Option<T>, ProjectFlowError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(ProjectFlowError::Validation),
        None => Ok(None),
    }
}

/// A flag is on unless absent, empty, `false` or `0`.
fn is_set(value: Option<&str>) -> bool {
    value
        .map(str::trim)
        .is_some_and(|v| !(v.is_empty() || v.eq_ignore_ascii_case("false") || v == "0"))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PriorityRequest {
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

/// Response of `sync_calendar`
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncResponse {
    Success { message: String, event_id: String, event_link: Option<String> },
    /// The client must visit `url` to connect Google Calendar first.
    Redirect { url: String },
}

impl From<SyncOutcome> for SyncResponse {
    fn from(outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::NeedsAuthorization { auth_path } => Self::Redirect { url: auth_path },
            SyncOutcome::Synced { action, event } => {
                let message = match action {
                    SyncAction::Created => "Event created in Google Calendar",
                    SyncAction::Updated => "Event updated in Google Calendar",
                };
                Self::Success {
                    message: message.to_string(),
                    event_id: event.id,
                    event_link: event.html_link,
                }
            }
        }
    }
}

/// `GET /api/tasks/`
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    QueryParams(params): QueryParams<TaskListParams>,
) -> ApiResult<Json<Vec<TaskDetails>>> {
    let tasks = execute_command("tasks::list", async {
        let query = params.into_query()?;
        ctx.tasks.list(user.id(), &query).await
    })
    .await?;
    Ok(Json(tasks))
}

/// `POST /api/tasks/`
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    JsonBody(input): JsonBody<NewTask>,
) -> ApiResult<(StatusCode, Json<TaskDetails>)> {
    let task = execute_command("tasks::create", ctx.tasks.create(user.id(), input)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /api/tasks/{id}/`
pub async fn retrieve(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<TaskDetails>> {
    let task = execute_command("tasks::retrieve", ctx.tasks.get(user.id(), task_id)).await?;
    Ok(Json(task))
}

/// `PATCH|PUT /api/tasks/{id}/`
pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
    JsonBody(update): JsonBody<TaskUpdate>,
) -> ApiResult<Json<TaskDetails>> {
    let task =
        execute_command("tasks::update", ctx.tasks.update(user.id(), task_id, update)).await?;
    Ok(Json(task))
}

/// `DELETE /api/tasks/{id}/`
pub async fn destroy(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<StatusCode> {
    execute_command("tasks::destroy", ctx.tasks.delete(user.id(), task_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /api/tasks/{id}/status/`
pub async fn update_status(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
    JsonBody(request): JsonBody<StatusRequest>,
) -> ApiResult<Json<TaskDetails>> {
    let task = execute_command("tasks::update_status", async {
        let status = request
            .status
            .ok_or_else(|| ProjectFlowError::Validation("status is required".into()))?;
        ctx.tasks.update_status(user.id(), task_id, status).await
    })
    .await?;
    Ok(Json(task))
}

/// `PATCH /api/tasks/{id}/priority/`
pub async fn update_priority(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
    JsonBody(request): JsonBody<PriorityRequest>,
) -> ApiResult<Json<TaskDetails>> {
    let task = execute_command("tasks::update_priority", async {
        let priority = request
            .priority
            .ok_or_else(|| ProjectFlowError::Validation("priority is required".into()))?;
        ctx.tasks.update_priority(user.id(), task_id, priority).await
    })
    .await?;
    Ok(Json(task))
}

/// `GET /api/tasks/{id}/comments/`
pub async fn comments(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Vec<CommentDetails>>> {
    let comments =
        execute_command("tasks::comments", ctx.comments.list(user.id(), task_id)).await?;
    Ok(Json(comments))
}

/// `POST /api/tasks/{id}/add_comment/`
pub async fn add_comment(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentDetails>)> {
    let comment =
        execute_command("tasks::add_comment", ctx.comments.add(user.id(), task_id, &request.text))
            .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET|POST /api/tasks/{id}/sync_calendar/`
///
/// Opens a session when the request carries none, since the OAuth detour
/// stores the pending task in it.
pub async fn sync_calendar(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(task_id): Path<TaskId>,
) -> ApiResult<(HeaderMap, Json<SyncResponse>)> {
    let (outcome, cookie) = execute_command("tasks::sync_calendar", async {
        let (session, created) =
            ctx.sessions.resume_or_open(user.id(), user.session_id.as_deref()).await?;
        let outcome = ctx.calendar_sync.sync_task(&session, task_id).await?;
        let cookie = created.then(|| session_cookie(session.id(), ctx.session_ttl_secs()));
        Ok::<_, ProjectFlowError>((outcome, cookie))
    })
    .await?;

    let mut headers = HeaderMap::new();
    append_session_cookie(&mut headers, cookie.as_ref());
    Ok((headers, Json(outcome.into())))
}
