//! Route table

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::commands::{analytics, auth, calendar, health, projects, tasks};
use crate::context::AppContext;

/// Every `/api` route, wired to `ctx`. Paths keep their trailing slash.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let router = Router::new().route("/api/health/", get(health::get_health));
    let router = auth_routes(router);
    let router = project_routes(router);
    let router = task_routes(router);
    let router = calendar_routes(router);
    let router = analytics_routes(router);

    router.layer(TraceLayer::new_for_http()).with_state(ctx)
}

type AppRouter = Router<Arc<AppContext>>;

fn auth_routes(router: AppRouter) -> AppRouter {
    router
        .route("/api/auth/register/", post(auth::register))
        .route("/api/auth/login/", post(auth::login))
        .route("/api/auth/refresh/", post(auth::refresh))
        .route("/api/auth/logout/", post(auth::logout))
        .route("/api/auth/me/", get(auth::me))
        .route("/api/auth/statistics/", get(auth::statistics))
}

fn project_routes(router: AppRouter) -> AppRouter {
    router
        .route("/api/projects/", get(projects::list).post(projects::create))
        .route("/api/projects/all_users/", get(projects::all_users))
        .route(
            "/api/projects/{id}/",
            get(projects::retrieve)
                .patch(projects::update)
                .put(projects::update)
                .delete(projects::destroy),
        )
        .route("/api/projects/{id}/add_member/", post(projects::add_member))
        .route("/api/projects/{id}/remove_member/", post(projects::remove_member))
        .route("/api/projects/{id}/kanban/", get(projects::kanban))
        .route("/api/projects/{id}/tasks/", get(projects::tasks))
}

fn task_routes(router: AppRouter) -> AppRouter {
    router
        .route("/api/tasks/", get(tasks::list).post(tasks::create))
        .route(
            "/api/tasks/{id}/",
            get(tasks::retrieve).patch(tasks::update).put(tasks::update).delete(tasks::destroy),
        )
        .route("/api/tasks/{id}/status/", patch(tasks::update_status))
        .route("/api/tasks/{id}/priority/", patch(tasks::update_priority))
        .route("/api/tasks/{id}/comments/", get(tasks::comments))
        .route("/api/tasks/{id}/add_comment/", post(tasks::add_comment))
        .route(
            "/api/tasks/{id}/sync_calendar/",
            get(tasks::sync_calendar).post(tasks::sync_calendar),
        )
}

fn calendar_routes(router: AppRouter) -> AppRouter {
    router
        .route("/api/calendar/auth-url/", get(calendar::auth_url))
        .route("/api/calendar/auth-callback/", get(calendar::auth_callback))
        .route("/api/calendar/success/", get(calendar::success))
}

fn analytics_routes(router: AppRouter) -> AppRouter {
    router
        .route("/api/analytics/tasks-by-status/", get(analytics::tasks_by_status))
        .route("/api/analytics/tasks-by-user/", get(analytics::tasks_by_user))
        .route("/api/analytics/project-progress/{project_id}/", get(analytics::project_progress))
}
