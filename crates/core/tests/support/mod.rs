//! Shared test helpers for `projectflow-core` integration tests.
//!
//! [`TestApp`] wires every service against the in-memory store and the
//! calendar fakes.

#![allow(dead_code)]

pub mod auth;
pub mod calendar;
pub mod repositories;

use std::sync::Arc;

use chrono::Duration;
use projectflow_core::{
    AccountService, AnalyticsService, CalendarAuthService, CalendarSyncService, CommentService,
    ProjectService, SessionService, TaskService, UserRepository,
};
use projectflow_domain::{NewProject, NewTask, NewUser, ProjectDetails, TaskDetails, User, UserId};

use self::auth::{PlainPasswordHasher, SequentialTokenIssuer};
use self::calendar::{FakeAuthProvider, FakeEventGateway};
use self::repositories::InMemoryStore;

pub struct TestApp {
    pub store: InMemoryStore,
    pub provider: Arc<FakeAuthProvider>,
    pub gateway: Arc<FakeEventGateway>,
    pub accounts: AccountService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub comments: CommentService,
    pub sessions: SessionService,
    pub calendar_auth: CalendarAuthService,
    pub calendar_sync: CalendarSyncService,
    pub analytics: AnalyticsService,
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let provider = Arc::new(FakeAuthProvider::default());
        let gateway = Arc::new(FakeEventGateway::default());
        let repo = Arc::new(store.clone());

        Self {
            accounts: AccountService::new(
                repo.clone(),
                repo.clone(),
                Arc::new(PlainPasswordHasher),
                Arc::new(SequentialTokenIssuer::default()),
                repo.clone(),
                repo.clone(),
                repo.clone(),
            ),
            projects: ProjectService::new(repo.clone(), repo.clone(), repo.clone(), repo.clone()),
            tasks: TaskService::new(repo.clone(), repo.clone(), repo.clone(), repo.clone()),
            comments: CommentService::new(repo.clone(), repo.clone(), repo.clone(), repo.clone()),
            sessions: SessionService::new(repo.clone(), Duration::days(14)),
            calendar_auth: CalendarAuthService::new(provider.clone(), repo.clone()),
            calendar_sync: CalendarSyncService::new(
                repo.clone(),
                repo.clone(),
                repo.clone(),
                provider.clone(),
                gateway.clone(),
            ),
            analytics: AnalyticsService::new(repo.clone(), repo.clone(), repo),
            store,
            provider,
            gateway,
        }
    }

    /// Insert a user with password `correct-horse`.
    pub async fn user(&self, username: &str) -> User {
        let (user, _) = UserRepository::create_with_profile(
            &self.store,
            NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                first_name: String::new(),
                last_name: String::new(),
            },
            "plain:correct-horse".to_string(),
        )
        .await
        .unwrap();
        user
    }

    pub async fn project(&self, owner: UserId, name: &str, member_ids: Vec<UserId>) -> ProjectDetails {
        self.projects
            .create(owner, NewProject { name: name.to_string(), description: String::new(), member_ids })
            .await
            .unwrap()
    }

    pub async fn task(&self, user: UserId, project_id: i64, title: &str) -> TaskDetails {
        self.tasks.create(user, new_task(project_id, title)).await.unwrap()
    }
}

pub fn new_task(project_id: i64, title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: String::new(),
        status: Default::default(),
        priority: Default::default(),
        project_id,
        assignee_id: None,
        due_date: None,
    }
}
