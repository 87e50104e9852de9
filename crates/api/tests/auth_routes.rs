//! Registration, JWT lifecycle and current-user endpoints.

mod support;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{TestApp, PASSWORD};

#[tokio::test(flavor = "multi_thread")]
async fn register_returns_user_and_token_pair() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    let me = app.get("/api/auth/me/").token(&alice).send().await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], alice.id);
    assert_eq!(me.body["username"], "alice");
    assert_eq!(me.body["email"], "alice@example.com");
    assert_eq!(me.body["profile"]["calendar_connected"], false);
    assert!(me.body["profile"]["id"].is_i64());
}

#[tokio::test(flavor = "multi_thread")]
async fn register_rejects_mismatched_passwords() {
    let app = TestApp::new().await;
    let response = app
        .post("/api/auth/register/")
        .json(json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": PASSWORD,
            "password2": "something-else-1",
        }))
        .send()
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "error");
    assert_eq!(response.body["error_type"], "validation");
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_username_is_a_validation_error() {
    let app = TestApp::new().await;
    app.register("carol").await;

    let response = app
        .post("/api/auth/register/")
        .json(json!({
            "username": "carol",
            "email": "other@example.com",
            "password": PASSWORD,
            "password2": PASSWORD,
        }))
        .send()
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn login_flattens_tokens_next_to_user() {
    let app = TestApp::new().await;
    app.register("dave").await;

    let response = app
        .post("/api/auth/login/")
        .json(json!({ "username": "dave", "password": PASSWORD }))
        .send()
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["access"].is_string());
    assert!(response.body["refresh"].is_string());
    assert_eq!(response.body["user"]["username"], "dave");
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.register("erin").await;

    let response = app
        .post("/api/auth/login/")
        .json(json!({ "username": "erin", "password": "not-the-password" }))
        .send()
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error_type"], "authentication");
}

#[tokio::test(flavor = "multi_thread")]
async fn requests_without_credentials_are_rejected() {
    let app = TestApp::new().await;

    let response = app.get("/api/projects/").send().await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get("/api/projects/").raw_token("not-a-jwt").send().await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_token_cannot_be_used_as_access_token() {
    let app = TestApp::new().await;
    let frank = app.register("frank").await;

    let response = app.get("/api/auth/me/").raw_token(&frank.refresh).send().await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_revokes_the_refresh_token() {
    let app = TestApp::new().await;
    let grace = app.register("grace").await;

    let refreshed = app
        .post("/api/auth/refresh/")
        .json(json!({ "refresh": grace.refresh }))
        .send()
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.body["access"].is_string());

    let logout = app
        .post("/api/auth/logout/")
        .token(&grace)
        .json(json!({ "refresh": grace.refresh }))
        .send()
        .await;
    assert_eq!(logout.status, StatusCode::RESET_CONTENT);

    let again = app
        .post("/api/auth/refresh/")
        .json(json!({ "refresh": grace.refresh }))
        .send()
        .await;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_without_refresh_token_is_a_validation_error() {
    let app = TestApp::new().await;
    let heidi = app.register("heidi").await;

    let response = app.post("/api/auth/logout/").token(&heidi).json(json!({})).send().await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn statistics_count_membership_and_assignments() {
    let app = TestApp::new().await;
    let ivan = app.register("ivan").await;
    let project = app.create_project(&ivan, "Stats", &[]).await;
    app.create_task(&ivan, project, json!({ "title": "Open", "assignee_id": ivan.id })).await;
    app.create_task(
        &ivan,
        project,
        json!({ "title": "Finished", "assignee_id": ivan.id, "status": "done" }),
    )
    .await;
    app.create_task(&ivan, project, json!({ "title": "Unassigned" })).await;

    let response = app.get("/api/auth/statistics/").token(&ivan).send().await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "projects_count": 1, "tasks_count": 2, "completed_tasks_count": 1 })
    );
}
