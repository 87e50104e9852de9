//! Account endpoints: registration, JWT lifecycle and the current user

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use projectflow_core::{AccessToken, AuthSession, LoginRequest, RegisterRequest};
use projectflow_domain::{CurrentUser, UserStatistics, UserSummary};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::{AuthUser, JsonBody};
use crate::utils::command_helpers::execute_command;

/// Login response: the token pair flattened next to the user
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub refresh: String,
    pub access: String,
    pub user: UserSummary,
}

impl From<AuthSession> for LoginResponse {
    fn from(session: AuthSession) -> Self {
        Self { refresh: session.tokens.refresh, access: session.tokens.access, user: session.user }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

/// `POST /api/auth/register/`
pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = execute_command("auth::register", ctx.accounts.register(request)).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `POST /api/auth/login/`
pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let session = execute_command("auth::login", ctx.accounts.login(request)).await?;
    Ok(Json(session.into()))
}

/// `POST /api/auth/refresh/`
pub async fn refresh(
    State(ctx): State<Arc<AppContext>>,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> ApiResult<Json<AccessToken>> {
    let token = request.refresh.unwrap_or_default();
    let access = execute_command("auth::refresh", ctx.accounts.refresh(&token)).await?;
    Ok(Json(access))
}

/// `POST /api/auth/logout/` - revokes the refresh token, answers 205.
pub async fn logout(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> ApiResult<StatusCode> {
    execute_command("auth::logout", ctx.accounts.logout(user.id(), request.refresh.as_deref()))
        .await?;
    Ok(StatusCode::RESET_CONTENT)
}

/// `GET /api/auth/me/`
pub async fn me(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
) -> ApiResult<Json<CurrentUser>> {
    let current = execute_command("auth::me", ctx.accounts.current_user(user.id())).await?;
    Ok(Json(current))
}

/// `GET /api/auth/statistics/`
pub async fn statistics(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
) -> ApiResult<Json<UserStatistics>> {
    let stats = execute_command("auth::statistics", ctx.accounts.statistics(user.id())).await?;
    Ok(Json(stats))
}
