//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Field limits
pub const MAX_PROJECT_NAME_LENGTH: usize = 100;
pub const MAX_TASK_TITLE_LENGTH: usize = 200;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

// Calendar sync
pub const CALENDAR_EVENT_DURATION_MINUTES: i64 = 60;
pub const CALENDAR_DEFAULT_LEAD_HOURS: i64 = 24;
pub const CALENDAR_EMPTY_DESCRIPTION: &str = "No description";
pub const CALENDAR_PRIMARY_ID: &str = "primary";

// Session keys used by the OAuth handoff
pub const SESSION_OAUTH_STATE_KEY: &str = "calendar_oauth_state";
pub const SESSION_PENDING_TASK_KEY: &str = "calendar_pending_task_id";

// Client-facing paths for the OAuth handoff
pub const CALENDAR_AUTH_URL_PATH: &str = "/api/calendar/auth-url/";
pub const CALENDAR_SUCCESS_PATH: &str = "/api/calendar/success/";

/// Path that resumes calendar sync for `task_id` after authorization.
pub fn task_sync_path(task_id: i64) -> String {
    format!("/api/tasks/{}/sync_calendar/", task_id)
}
