//! Calendar OAuth handoff and event sync types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TaskId;

/// Tokens returned by the provider's token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Credential triple persisted on the profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CalendarCredentials {
    /// Apply a fresh grant; a grant without a refresh token keeps the old one.
    pub fn merge_grant(previous_refresh_token: Option<String>, grant: TokenGrant) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token.or(previous_refresh_token),
            expires_at: grant.expires_at,
        }
    }
}

/// Event body pushed to the calendar provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventDraft {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub time_zone: String,
}

/// Event as acknowledged by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Updated,
}

/// Result of a sync request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No stored token; the task id was stashed and the client must authorize.
    NeedsAuthorization { auth_path: String },
    Synced { action: SyncAction, event: RemoteEvent },
}

/// Where the OAuth callback sends the browser next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Completed,
    /// A sync was interrupted by the authorization detour.
    ResumeSync { task_id: TaskId },
}
