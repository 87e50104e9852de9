//! OAuth2 authorization-code handoff with the calendar provider

use std::sync::Arc;

use projectflow_common::auth::{generate_state, validate_state};
use projectflow_domain::constants::{SESSION_OAUTH_STATE_KEY, SESSION_PENDING_TASK_KEY};
use projectflow_domain::{CalendarCredentials, CallbackOutcome, ProjectFlowError, Result};
use tracing::{info, warn};

use super::ports::CalendarAuthProvider;
use super::CallbackParams;
use crate::accounts::ports::ProfileRepository;
use crate::sessions::SessionContext;

/// Drives authorization URL issuance and the provider callback
pub struct CalendarAuthService {
    provider: Arc<dyn CalendarAuthProvider>,
    profiles: Arc<dyn ProfileRepository>,
}

impl CalendarAuthService {
    pub fn new(provider: Arc<dyn CalendarAuthProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { provider, profiles }
    }

    /// Issue a provider authorization URL bound to a fresh state nonce.
    ///
    /// The nonce replaces any earlier one stored in the session.
    pub async fn request_authorization_url(&self, session: &SessionContext) -> Result<String> {
        let state = generate_state();
        session.set(SESSION_OAUTH_STATE_KEY, &state).await?;
        let url = self.provider.authorization_url(&state)?;
        info!(user_id = session.user_id(), "Calendar authorization URL issued");
        Ok(url)
    }

    /// Verify the echoed state, exchange the code and persist the tokens.
    ///
    /// On any failure the profile is untouched and the stored nonce stays in
    /// the session. On success the nonce is cleared and a pending task id, if
    /// one was stashed, is consumed.
    pub async fn handle_callback(
        &self,
        session: &SessionContext,
        params: &CallbackParams,
    ) -> Result<CallbackOutcome> {
        let user_id = session.user_id();

        if let Some(error) = params.error.as_deref() {
            warn!(user_id, provider_error = error, "Calendar authorization declined");
            return Err(ProjectFlowError::Authentication(format!(
                "Calendar authorization failed: {}",
                error
            )));
        }

        let expected = session.get(SESSION_OAUTH_STATE_KEY).await?.ok_or_else(|| {
            ProjectFlowError::Authentication(
                "No calendar authorization is in progress for this session".into(),
            )
        })?;
        let received = params.state.as_deref().unwrap_or_default();
        if !validate_state(&expected, received) {
            warn!(user_id, "OAuth state mismatch on calendar callback");
            return Err(ProjectFlowError::Authentication("OAuth state mismatch".into()));
        }

        let code = params
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| ProjectFlowError::Validation("Missing authorization code".into()))?;

        let grant = self.provider.exchange_code(code).await?;

        let previous_refresh_token = self
            .profiles
            .get_by_user(user_id)
            .await?
            .and_then(|profile| profile.calendar_refresh_token);
        let credentials = CalendarCredentials::merge_grant(previous_refresh_token, grant);
        self.profiles.save_calendar_credentials(user_id, &credentials).await?;

        session.take(SESSION_OAUTH_STATE_KEY).await?;
        info!(user_id, "Calendar authorization completed");

        let pending = session.take(SESSION_PENDING_TASK_KEY).await?;
        match pending.as_deref().map(str::parse::<i64>) {
            Some(Ok(task_id)) => Ok(CallbackOutcome::ResumeSync { task_id }),
            Some(Err(_)) => {
                warn!(user_id, "Discarding malformed pending task id");
                Ok(CallbackOutcome::Completed)
            }
            None => Ok(CallbackOutcome::Completed),
        }
    }
}
