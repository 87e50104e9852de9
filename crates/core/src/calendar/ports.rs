//! Calendar provider port interfaces

use async_trait::async_trait;
use projectflow_domain::{CalendarEventDraft, RemoteEvent, Result, TokenGrant};

/// OAuth2 authorization-code flow against the calendar provider
#[async_trait]
pub trait CalendarAuthProvider: Send + Sync {
    /// Authorization URL embedding `state`, the calendar scope and the
    /// configured redirect target. Requests offline access with forced consent.
    fn authorization_url(&self, state: &str) -> Result<String>;

    /// Trade an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;

    /// Obtain a new access token from a stored refresh token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant>;
}

/// Event writes on the user's primary calendar
#[async_trait]
pub trait CalendarEventGateway: Send + Sync {
    async fn create_event(&self, access_token: &str, draft: &CalendarEventDraft)
        -> Result<RemoteEvent>;

    async fn update_event(
        &self,
        access_token: &str,
        event_id: &str,
        draft: &CalendarEventDraft,
    ) -> Result<RemoteEvent>;
}
