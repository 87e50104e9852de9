//! Google Calendar integration: OAuth handoff and task event sync.
//!
//! Handoff states: no token stored → authorization URL issued (state nonce
//! in the session) → callback verified and tokens persisted on the profile.

pub mod handoff;
pub mod ports;
pub mod sync;

use chrono::Duration;
use serde::Deserialize;

pub use handoff::CalendarAuthService;
pub use sync::CalendarSyncService;

/// Query parameters of the provider's redirect back to the callback
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declined consent
    pub error: Option<String>,
}

/// Event sync settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub time_zone: String,
    pub title_prefix: String,
    /// Refresh the access token when it expires within this window
    pub refresh_threshold: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            time_zone: "UTC".to_string(),
            title_prefix: "[ProjectFlow]".to_string(),
            refresh_threshold: Duration::minutes(5),
        }
    }
}
