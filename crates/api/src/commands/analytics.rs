//! Chart data endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use projectflow_domain::{ChartSeries, ProjectId, ProjectProgress};
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::extract::{AuthUser, QueryParams};
use crate::utils::command_helpers::execute_command;

/// Optional project scope of a chart
#[derive(Debug, Default, Deserialize)]
pub struct ScopeParams {
    pub project_id: Option<ProjectId>,
}

/// `GET /api/analytics/tasks-by-status/`
pub async fn tasks_by_status(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    QueryParams(scope): QueryParams<ScopeParams>,
) -> ApiResult<Json<ChartSeries>> {
    let series = execute_command(
        "analytics::tasks_by_status",
        ctx.analytics.tasks_by_status(user.id(), scope.project_id),
    )
    .await?;
    Ok(Json(series))
}

/// `GET /api/analytics/tasks-by-user/`
pub async fn tasks_by_user(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    QueryParams(scope): QueryParams<ScopeParams>,
) -> ApiResult<Json<ChartSeries>> {
    let series = execute_command(
        "analytics::tasks_by_user",
        ctx.analytics.tasks_by_user(user.id(), scope.project_id),
    )
    .await?;
    Ok(Json(series))
}

/// `GET /api/analytics/project-progress/{project_id}/`
pub async fn project_progress(
    State(ctx): State<Arc<AppContext>>,
    user: AuthUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<ProjectProgress>> {
    let progress = execute_command(
        "analytics::project_progress",
        ctx.analytics.project_progress(user.id(), project_id),
    )
    .await?;
    Ok(Json(progress))
}
