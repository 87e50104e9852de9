//! Google Calendar OAuth handoff endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::Json;
use projectflow_core::CallbackParams;
use projectflow_domain::constants::CALENDAR_SUCCESS_PATH;
use projectflow_domain::{CallbackOutcome, ProjectFlowError, TaskId};
use serde::Serialize;
use tracing::info;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::{AuthUser, QueryParams};
use crate::utils::command_helpers::execute_command;
use crate::utils::session_cookie::{append_session_cookie, read_session_id, session_cookie};

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectedResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Path the browser is sent to when a sync was waiting on authorization.
pub fn resume_sync_path(task_id: TaskId) -> String {
    format!("/api/tasks/{}/sync_calendar/", task_id)
}

/// `GET /api/calendar/auth-url/`
pub async fn auth_url(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
) -> ApiResult<(HeaderMap, Json<AuthUrlResponse>)> {
    let (auth_url, cookie) = execute_command("calendar::auth_url", async {
        let (session, created) =
            ctx.sessions.resume_or_open(user.id(), user.session_id.as_deref()).await?;
        let url = ctx.calendar_auth.request_authorization_url(&session).await?;
        let cookie = created.then(|| session_cookie(session.id(), ctx.session_ttl_secs()));
        Ok::<_, ProjectFlowError>((url, cookie))
    })
    .await?;

    let mut headers = HeaderMap::new();
    append_session_cookie(&mut headers, cookie.as_ref());
    Ok((headers, Json(AuthUrlResponse { auth_url })))
}

/// `GET /api/calendar/auth-callback/?code=&state=`
///
/// The provider redirects the browser here, so the user is resolved from the
/// session cookie rather than a bearer token.
pub async fn auth_callback(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    QueryParams(params): QueryParams<CallbackParams>,
) -> ApiResult<Redirect> {
    let outcome = execute_command("calendar::auth_callback", async {
        let session_id = read_session_id(&headers).ok_or_else(|| {
            ProjectFlowError::Authentication("No session for calendar authorization".into())
        })?;
        let session = ctx.sessions.resume(&session_id).await?.ok_or_else(|| {
            ProjectFlowError::Authentication("Session expired, restart calendar authorization".into())
        })?;
        ctx.calendar_auth.handle_callback(&session, &params).await
    })
    .await?;

    let target = match outcome {
        CallbackOutcome::Completed => CALENDAR_SUCCESS_PATH.to_string(),
        CallbackOutcome::ResumeSync { task_id } => {
            info!(task_id, "resuming calendar sync after authorization");
            resume_sync_path(task_id)
        }
    };
    Ok(Redirect::to(&target))
}

/// `GET /api/calendar/success/`
pub async fn success() -> Json<ConnectedResponse> {
    Json(ConnectedResponse { success: true, message: "Google Calendar connected successfully" })
}
