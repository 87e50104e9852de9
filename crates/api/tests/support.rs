#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use projectflow_domain::{CalendarConfig, Config};
use projectflow_lib::{build_router, AppContext};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::cookie::Cookie;
use wiremock::MockServer;

pub const PASSWORD: &str = "correct-horse-42";

/// Router over a throwaway database with Google mocked by `google`.
pub struct TestApp {
    pub router: Router,
    pub ctx: Arc<AppContext>,
    pub google: MockServer,
    _temp_dir: TempDir,
}

/// Decoded response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` part of the session `Set-Cookie`, ready for a `Cookie` header.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::parse(value).ok())
            .find(|cookie| cookie.name() == "projectflow_session")
            .map(|cookie| cookie.stripped().to_string())
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|value| value.to_str().ok())
    }
}

/// Registered user with a valid access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub access: String,
    pub refresh: String,
}

/// Request builder used by the route tests
pub struct Call<'a> {
    app: &'a TestApp,
    method: Method,
    uri: String,
    token: Option<String>,
    cookie: Option<String>,
    body: Option<Value>,
}

impl<'a> Call<'a> {
    pub fn token(mut self, user: &TestUser) -> Self {
        self.token = Some(user.access.clone());
        self
    }

    pub fn raw_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn cookie(mut self, cookie: &str) -> Self {
        self.cookie = Some(cookie.to_string());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let request = match self.body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse { status, headers, body }
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let google = MockServer::start().await;

        let mut config = Config::default();
        config.database.path = temp_dir.path().join("api.db").display().to_string();
        config.database.pool_size = 4;
        config.auth.jwt_secret = "route-test-secret".to_string();
        config.calendar = CalendarConfig {
            client_id: "client-123".into(),
            client_secret: "secret-456".into(),
            token_endpoint: format!("{}/token", google.uri()),
            api_base_url: format!("{}/calendar/v3", google.uri()),
            request_timeout_secs: 2,
            ..CalendarConfig::default()
        };

        let ctx = Arc::new(AppContext::new_with_config(config).expect("context should build"));
        let router = build_router(Arc::clone(&ctx));
        Self { router, ctx, google, _temp_dir: temp_dir }
    }

    pub fn call(&self, method: Method, uri: &str) -> Call<'_> {
        Call { app: self, method, uri: uri.to_string(), token: None, cookie: None, body: None }
    }

    pub fn get(&self, uri: &str) -> Call<'_> {
        self.call(Method::GET, uri)
    }

    pub fn post(&self, uri: &str) -> Call<'_> {
        self.call(Method::POST, uri)
    }

    pub fn patch(&self, uri: &str) -> Call<'_> {
        self.call(Method::PATCH, uri)
    }

    pub fn delete(&self, uri: &str) -> Call<'_> {
        self.call(Method::DELETE, uri)
    }

    /// Register `username` through the API.
    pub async fn register(&self, username: &str) -> TestUser {
        let response = self
            .post("/api/auth/register/")
            .json(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": PASSWORD,
                "password2": PASSWORD,
                "first_name": username,
            }))
            .send()
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "register failed: {:?}", response.body);

        TestUser {
            id: response.body["user"]["id"].as_i64().unwrap(),
            username: username.to_string(),
            access: response.body["tokens"]["access"].as_str().unwrap().to_string(),
            refresh: response.body["tokens"]["refresh"].as_str().unwrap().to_string(),
        }
    }

    /// Create a project owned by `owner`, returning its id.
    pub async fn create_project(&self, owner: &TestUser, name: &str, members: &[i64]) -> i64 {
        let response = self
            .post("/api/projects/")
            .token(owner)
            .json(json!({ "name": name, "member_ids": members }))
            .send()
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "create failed: {:?}", response.body);
        response.body["id"].as_i64().unwrap()
    }

    /// Create a task in `project`, returning its id.
    pub async fn create_task(&self, owner: &TestUser, project: i64, body: Value) -> i64 {
        let mut body = body;
        body["project"] = json!(project);
        let response = self.post("/api/tasks/").token(owner).json(body).send().await;
        assert_eq!(response.status, StatusCode::CREATED, "create task failed: {:?}", response.body);
        response.body["id"].as_i64().unwrap()
    }
}
