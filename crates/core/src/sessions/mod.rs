//! Server-side sessions carrying the OAuth handoff state.

pub mod ports;

use std::sync::Arc;

use chrono::{Duration, Utc};
use projectflow_common::auth::generate_session_id;
use projectflow_domain::{Result, UserId};
use tracing::debug;

use self::ports::SessionStore;

/// Handle on one user's session, passed explicitly to every handoff step
#[derive(Clone)]
pub struct SessionContext {
    id: String,
    user_id: UserId,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").field("user_id", &self.user_id).finish_non_exhaustive()
    }
}

impl SessionContext {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.get_value(&self.id, key).await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.store.set_value(&self.id, key, value).await
    }

    /// Remove a value, returning it if it was present.
    pub async fn take(&self, key: &str) -> Result<Option<String>> {
        self.store.take_value(&self.id, key).await
    }
}

/// Opens and resumes sessions
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Start a fresh session for `user_id`.
    pub async fn open(&self, user_id: UserId) -> Result<SessionContext> {
        let id = generate_session_id();
        self.store.insert(&id, user_id, Utc::now() + self.ttl).await?;
        debug!(user_id, "Session opened");
        Ok(SessionContext { id, user_id, store: self.store.clone() })
    }

    /// Session `session_id` if it exists and has not expired.
    pub async fn resume(&self, session_id: &str) -> Result<Option<SessionContext>> {
        let owner = self.store.owner(session_id, Utc::now()).await?;
        Ok(owner.map(|user_id| SessionContext {
            id: session_id.to_string(),
            user_id,
            store: self.store.clone(),
        }))
    }

    /// Reuse `session_id` when it belongs to `user_id`, otherwise open a new
    /// session. The flag is true when a new session was created.
    pub async fn resume_or_open(
        &self,
        user_id: UserId,
        session_id: Option<&str>,
    ) -> Result<(SessionContext, bool)> {
        if let Some(session_id) = session_id {
            if let Some(session) = self.resume(session_id).await? {
                if session.user_id == user_id {
                    return Ok((session, false));
                }
            }
        }
        Ok((self.open(user_id).await?, true))
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        self.store.purge_expired(Utc::now()).await
    }
}
