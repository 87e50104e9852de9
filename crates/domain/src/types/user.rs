//! User and profile types
//!
//! The profile is created together with its user and holds the Google
//! Calendar credentials written by the OAuth callback.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// "first last", trimmed. Empty when neither name is set.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Full name, falling back to the username.
    pub fn display_name(&self) -> String {
        let full_name = self.full_name();
        if full_name.is_empty() {
            self.username.clone()
        } else {
            full_name
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary::from(self)
    }
}

/// Public view of a user embedded in other read models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Fields needed to insert a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// One-to-one companion of [`User`] holding external calendar credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: UserId,
    #[serde(skip_serializing)]
    pub calendar_access_token: Option<String>,
    #[serde(skip_serializing)]
    pub calendar_refresh_token: Option<String>,
    pub calendar_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// True once an access token has been stored.
    pub fn has_calendar_access(&self) -> bool {
        self.calendar_access_token.as_deref().is_some_and(|token| !token.is_empty())
    }

    /// True when the stored expiry falls before `now + threshold`.
    ///
    /// A token without a recorded expiry is treated as still valid.
    pub fn calendar_token_expires_within(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.calendar_token_expiry.is_some_and(|expiry| expiry <= now + threshold)
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id,
            calendar_connected: self.has_calendar_access(),
            calendar_token_expiry: self.calendar_token_expiry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i64,
    pub calendar_connected: bool,
    pub calendar_token_expiry: Option<DateTime<Utc>>,
}

/// Response of the current-user endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: UserSummary,
    pub profile: ProfileSummary,
}

/// Per-user counters shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStatistics {
    pub projects_count: u64,
    /// Tasks assigned to the user
    pub tasks_count: u64,
    pub completed_tasks_count: u64,
}
