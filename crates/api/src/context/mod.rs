//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use projectflow_core::{
    AccountService, AnalyticsService, CalendarAuthService, CalendarSyncService, CommentService,
    ProjectService, SessionService, SyncSettings, TaskService,
};
use projectflow_domain::{Config, ProjectFlowError, Result};
use projectflow_infra::{
    Argon2PasswordHasher, DbManager, GoogleCalendarClient, GoogleCalendarOAuth, JwtTokenIssuer,
    SqliteCommentRepository, SqliteProjectRepository, SqliteRevokedTokenRepository,
    SqliteSessionStore, SqliteTaskRepository, SqliteUserRepository,
};
use tokio::task;
use tracing::{error, info};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,

    pub accounts: AccountService,
    pub sessions: SessionService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub comments: CommentService,
    pub analytics: AnalyticsService,

    // Calendar integration
    pub calendar_auth: CalendarAuthService,
    pub calendar_sync: CalendarSyncService,
}

impl AppContext {
    /// Open the database, run migrations and wire every service.
    pub fn new_with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::new(
            &config.database.path,
            config.database.pool_size,
            config.database.busy_timeout_ms,
        )?);
        db.run_migrations()?;

        let users = Arc::new(SqliteUserRepository::new(Arc::clone(&db)));
        let projects = Arc::new(SqliteProjectRepository::new(Arc::clone(&db)));
        let tasks = Arc::new(SqliteTaskRepository::new(Arc::clone(&db)));
        let comments = Arc::new(SqliteCommentRepository::new(Arc::clone(&db)));
        let sessions = Arc::new(SqliteSessionStore::new(Arc::clone(&db)));
        let revoked = Arc::new(SqliteRevokedTokenRepository::new(Arc::clone(&db)));

        let auth = &config.auth;
        let tokens = Arc::new(JwtTokenIssuer::new(
            &auth.jwt_secret,
            auth.access_token_ttl_secs,
            auth.refresh_token_ttl_secs,
        ));
        let session_ttl = ChronoDuration::seconds(secs_to_i64(auth.session_ttl_secs)?);

        let calendar = &config.calendar;
        let oauth = Arc::new(GoogleCalendarOAuth::new(calendar)?);
        let events = Arc::new(GoogleCalendarClient::new(
            &calendar.api_base_url,
            Duration::from_secs(calendar.request_timeout_secs),
        )?);
        let sync_settings = SyncSettings {
            time_zone: calendar.time_zone.clone(),
            title_prefix: calendar.event_title_prefix.clone(),
            refresh_threshold: ChronoDuration::seconds(secs_to_i64(
                calendar.refresh_threshold_secs,
            )?),
        };

        let context = Self {
            accounts: AccountService::new(
                users.clone(),
                users.clone(),
                Arc::new(Argon2PasswordHasher::new()),
                tokens,
                revoked,
                projects.clone(),
                tasks.clone(),
            ),
            sessions: SessionService::new(sessions, session_ttl),
            projects: ProjectService::new(
                projects.clone(),
                tasks.clone(),
                users.clone(),
                comments.clone(),
            ),
            tasks: TaskService::new(tasks.clone(), projects.clone(), users.clone(), comments.clone()),
            comments: CommentService::new(comments, tasks.clone(), projects.clone(), users.clone()),
            analytics: AnalyticsService::new(tasks.clone(), projects.clone(), users.clone()),
            calendar_auth: CalendarAuthService::new(oauth.clone(), users.clone()),
            calendar_sync: CalendarSyncService::new(tasks, projects, users, oauth, events)
                .with_settings(sync_settings),
            db,
            config,
        };

        info!(
            database = %context.db.path().display(),
            pool_size = context.config.database.pool_size,
            "application context initialized"
        );
        Ok(context)
    }

    /// Session cookie lifetime in seconds.
    pub fn session_ttl_secs(&self) -> u64 {
        self.config.auth.session_ttl_secs
    }

    /// Check every component the server depends on.
    pub async fn health_check(&self) -> HealthStatus {
        let components = vec![self.check_database_health().await, self.check_calendar_config()];
        let status = HealthStatus::from_components(components);
        if !status.is_healthy {
            error!(failing = ?status.failing(), "health check failed");
        }
        status
    }

    async fn check_database_health(&self) -> ComponentHealth {
        let db = Arc::clone(&self.db);
        match task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(health)) => ComponentHealth::healthy("database").with_message(format!(
                "{}/{} connections idle",
                health.idle_connections, health.max_size
            )),
            Ok(Err(err)) => ComponentHealth::unhealthy("database", err.to_string()),
            Err(err) => {
                ComponentHealth::unhealthy("database", format!("health check task failed: {err}"))
            }
        }
    }

    fn check_calendar_config(&self) -> ComponentHealth {
        let calendar = &self.config.calendar;
        if calendar.client_id.is_empty() || calendar.client_secret.is_empty() {
            ComponentHealth::unhealthy("calendar", "Google OAuth client is not configured")
        } else {
            ComponentHealth::healthy("calendar")
        }
    }
}

fn secs_to_i64(secs: u64) -> Result<i64> {
    i64::try_from(secs)
        .map_err(|_| ProjectFlowError::Config(format!("duration of {secs} seconds is too large")))
}
