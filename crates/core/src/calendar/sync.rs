//! Push a task's due date to the user's calendar

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use projectflow_domain::constants::{
    CALENDAR_AUTH_URL_PATH, CALENDAR_DEFAULT_LEAD_HOURS, CALENDAR_EMPTY_DESCRIPTION,
    CALENDAR_EVENT_DURATION_MINUTES, SESSION_PENDING_TASK_KEY,
};
use projectflow_domain::{
    CalendarCredentials, CalendarEventDraft, Profile, ProjectFlowError, Result, SyncAction,
    SyncOutcome, Task, TaskId,
};
use tracing::{info, warn};

use super::ports::{CalendarAuthProvider, CalendarEventGateway};
use super::SyncSettings;
use crate::access::visible_task;
use crate::accounts::ports::ProfileRepository;
use crate::projects::ports::ProjectRepository;
use crate::sessions::SessionContext;
use crate::tasks::ports::TaskRepository;

/// Creates or updates the calendar event linked to a task
pub struct CalendarSyncService {
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    profiles: Arc<dyn ProfileRepository>,
    auth: Arc<dyn CalendarAuthProvider>,
    events: Arc<dyn CalendarEventGateway>,
    settings: SyncSettings,
}

impl CalendarSyncService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        projects: Arc<dyn ProjectRepository>,
        profiles: Arc<dyn ProfileRepository>,
        auth: Arc<dyn CalendarAuthProvider>,
        events: Arc<dyn CalendarEventGateway>,
    ) -> Self {
        Self { tasks, projects, profiles, auth, events, settings: SyncSettings::default() }
    }

    pub fn with_settings(mut self, settings: SyncSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sync `task_id` for the session's user.
    ///
    /// Without a stored token the task id is stashed in the session and
    /// `NeedsAuthorization` is returned. Provider failures leave the task and
    /// profile unchanged so the call can simply be repeated.
    pub async fn sync_task(&self, session: &SessionContext, task_id: TaskId) -> Result<SyncOutcome> {
        let user_id = session.user_id();
        let (task, _) =
            visible_task(self.tasks.as_ref(), self.projects.as_ref(), user_id, task_id).await?;

        let profile = self.profiles.get_by_user(user_id).await?;
        let Some(profile) = profile.filter(Profile::has_calendar_access) else {
            session.set(SESSION_PENDING_TASK_KEY, &task.id.to_string()).await?;
            info!(user_id, task_id, "Calendar sync needs authorization");
            return Ok(SyncOutcome::NeedsAuthorization {
                auth_path: CALENDAR_AUTH_URL_PATH.to_string(),
            });
        };

        let access_token = self.usable_access_token(&profile).await?;
        let draft = self.build_draft(&task, Utc::now());

        let result = self.push_event(&task, &access_token, &draft).await;
        match &result {
            Ok(SyncOutcome::Synced { action, event }) => {
                info!(user_id, task_id, event_id = %event.id, ?action, "Task synced to calendar");
            }
            Ok(SyncOutcome::NeedsAuthorization { .. }) => {}
            Err(err) => warn!(user_id, task_id, error = %err, "Calendar sync failed"),
        }
        result
    }

    async fn push_event(
        &self,
        task: &Task,
        access_token: &str,
        draft: &CalendarEventDraft,
    ) -> Result<SyncOutcome> {
        if let Some(event_id) = task.calendar_event_id.as_deref() {
            match self.events.update_event(access_token, event_id, draft).await {
                Ok(event) => {
                    return Ok(SyncOutcome::Synced { action: SyncAction::Updated, event });
                }
                // Deleted on the provider side; fall through and recreate.
                Err(ProjectFlowError::NotFound(_)) => {
                    warn!(task_id = task.id, event_id, "Linked calendar event is gone, recreating");
                }
                Err(err) => return Err(err),
            }
        }

        let event = self.events.create_event(access_token, draft).await?;
        self.tasks.set_calendar_event_id(task.id, &event.id).await?;
        Ok(SyncOutcome::Synced { action: SyncAction::Created, event })
    }

    /// Stored access token, refreshed first when it is about to expire and a
    /// refresh token is available.
    async fn usable_access_token(&self, profile: &Profile) -> Result<String> {
        let stored = profile
            .calendar_access_token
            .clone()
            .ok_or_else(|| ProjectFlowError::Authentication("No calendar access token".into()))?;

        if !profile.calendar_token_expires_within(Utc::now(), self.settings.refresh_threshold) {
            return Ok(stored);
        }
        let Some(refresh_token) = profile.calendar_refresh_token.clone() else {
            return Ok(stored);
        };

        let grant = self.auth.refresh_access_token(&refresh_token).await?;
        let credentials = CalendarCredentials::merge_grant(Some(refresh_token), grant);
        self.profiles.save_calendar_credentials(profile.user_id, &credentials).await?;
        info!(user_id = profile.user_id, "Calendar access token refreshed");
        Ok(credentials.access_token)
    }

    /// Event window: due date (or `now` + 24h) for one hour.
    pub fn build_draft(&self, task: &Task, now: DateTime<Utc>) -> CalendarEventDraft {
        let start = task.due_date.unwrap_or(now + Duration::hours(CALENDAR_DEFAULT_LEAD_HOURS));
        let end = start + Duration::minutes(CALENDAR_EVENT_DURATION_MINUTES);
        let description = if task.description.trim().is_empty() {
            CALENDAR_EMPTY_DESCRIPTION.to_string()
        } else {
            task.description.clone()
        };

        CalendarEventDraft {
            summary: format!("{} {}", self.settings.title_prefix, task.title).trim().to_string(),
            description,
            start,
            end,
            time_zone: self.settings.time_zone.clone(),
        }
    }
}
