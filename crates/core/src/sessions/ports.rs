//! Port interface for server-side session storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use projectflow_domain::{Result, UserId};

/// Durable key-value store scoped to a browser session
///
/// Reads and writes are independent; one user drives their own session
/// serially so no compare-and-set is offered.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session_id: &str, user_id: UserId, expires_at: DateTime<Utc>)
        -> Result<()>;

    /// Owner of a session that has not expired at `now`.
    async fn owner(&self, session_id: &str, now: DateTime<Utc>) -> Result<Option<UserId>>;

    async fn get_value(&self, session_id: &str, key: &str) -> Result<Option<String>>;

    async fn set_value(&self, session_id: &str, key: &str, value: &str) -> Result<()>;

    /// Remove and return a value.
    async fn take_value(&self, session_id: &str, key: &str) -> Result<Option<String>>;

    /// Drop sessions that expired before `now`; returns how many.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
