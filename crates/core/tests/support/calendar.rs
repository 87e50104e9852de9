//! Scriptable calendar provider fakes

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use projectflow_core::{CalendarAuthProvider, CalendarEventGateway};
use projectflow_domain::{
    CalendarEventDraft, ProjectFlowError, RemoteEvent, Result as DomainResult, TokenGrant,
};

/// OAuth provider that accepts `good-code` and refresh tokens starting with `refresh`.
#[derive(Default)]
pub struct FakeAuthProvider {
    pub exchanged: Mutex<Vec<String>>,
    pub refreshed: Mutex<Vec<String>>,
    /// Omit the refresh token from code exchanges.
    pub omit_refresh_token: Mutex<bool>,
}

#[async_trait]
impl CalendarAuthProvider for FakeAuthProvider {
    fn authorization_url(&self, state: &str) -> DomainResult<String> {
        Ok(format!(
            "https://accounts.example.com/auth?access_type=offline&prompt=consent&state={}",
            state
        ))
    }

    async fn exchange_code(&self, code: &str) -> DomainResult<TokenGrant> {
        self.exchanged.lock().push(code.to_string());
        if code != "good-code" {
            return Err(ProjectFlowError::Authentication("invalid_grant".into()));
        }
        let refresh_token =
            if *self.omit_refresh_token.lock() { None } else { Some("refresh-1".to_string()) };
        Ok(TokenGrant {
            access_token: "access-1".into(),
            refresh_token,
            expires_at: Some(Utc::now() + Duration::hours(1)),
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> DomainResult<TokenGrant> {
        self.refreshed.lock().push(refresh_token.to_string());
        if !refresh_token.starts_with("refresh") {
            return Err(ProjectFlowError::Authentication("invalid_grant".into()));
        }
        Ok(TokenGrant {
            access_token: "access-refreshed".into(),
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventCall {
    Create { access_token: String, summary: String },
    Update { access_token: String, event_id: String },
}

/// Event gateway recording every call; events get ids `evt-<n>`.
#[derive(Default)]
pub struct FakeEventGateway {
    pub calls: Mutex<Vec<EventCall>>,
    pub drafts: Mutex<Vec<CalendarEventDraft>>,
    /// Fail every call with an `ExternalService` error.
    pub unavailable: Mutex<bool>,
    /// Answer updates with `NotFound`.
    pub events_deleted: Mutex<bool>,
    counter: AtomicU64,
}

impl FakeEventGateway {
    pub fn calls(&self) -> Vec<EventCall> {
        self.calls.lock().clone()
    }

    fn check_available(&self) -> DomainResult<()> {
        if *self.unavailable.lock() {
            Err(ProjectFlowError::ExternalService("Calendar API request timed out".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CalendarEventGateway for FakeEventGateway {
    async fn create_event(
        &self,
        access_token: &str,
        draft: &CalendarEventDraft,
    ) -> DomainResult<RemoteEvent> {
        self.check_available()?;
        self.calls.lock().push(EventCall::Create {
            access_token: access_token.to_string(),
            summary: draft.summary.clone(),
        });
        self.drafts.lock().push(draft.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RemoteEvent {
            id: format!("evt-{}", n),
            html_link: Some(format!("https://calendar.example.com/evt-{}", n)),
        })
    }

    async fn update_event(
        &self,
        access_token: &str,
        event_id: &str,
        draft: &CalendarEventDraft,
    ) -> DomainResult<RemoteEvent> {
        self.check_available()?;
        if *self.events_deleted.lock() {
            return Err(ProjectFlowError::NotFound(format!("Event {} not found", event_id)));
        }
        self.calls.lock().push(EventCall::Update {
            access_token: access_token.to_string(),
            event_id: event_id.to_string(),
        });
        self.drafts.lock().push(draft.clone());
        Ok(RemoteEvent { id: event_id.to_string(), html_link: None })
    }
}
