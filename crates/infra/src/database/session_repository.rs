//! Server-side session storage and the refresh-token blacklist

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use projectflow_core::{RevokedTokenRepository, SessionStore};
use projectflow_domain::{Result as DomainResult, UserId};
use rusqlite::{params, OptionalExtension};
use tokio::task;
use tracing::debug;

use super::codec::{map_join_error, to_millis};
use super::manager::DbManager;
use crate::errors::map_sql_error;

// =============================================================================
// Sessions
// =============================================================================

/// SQLite-backed implementation of `SessionStore`
pub struct SqliteSessionStore {
    db: Arc<DbManager>,
}

impl SqliteSessionStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn insert(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let session_id = session_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                params![session_id, user_id, to_millis(Utc::now()), to_millis(expires_at)],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn owner(&self, session_id: &str, now: DateTime<Utc>) -> DomainResult<Option<UserId>> {
        let db = Arc::clone(&self.db);
        let session_id = session_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<UserId>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT user_id FROM sessions WHERE id = ?1 AND expires_at > ?2",
                params![session_id, to_millis(now)],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_value(&self, session_id: &str, key: &str) -> DomainResult<Option<String>> {
        let db = Arc::clone(&self.db);
        let session_id = session_id.to_string();
        let key = key.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<String>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT value FROM session_values WHERE session_id = ?1 AND key = ?2",
                params![session_id, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_value(&self, session_id: &str, key: &str, value: &str) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let session_id = session_id.to_string();
        let key = key.to_string();
        let value = value.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO session_values (session_id, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(session_id, key) DO UPDATE SET value = excluded.value",
                params![session_id, key, value],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn take_value(&self, session_id: &str, key: &str) -> DomainResult<Option<String>> {
        let db = Arc::clone(&self.db);
        let session_id = session_id.to_string();
        let key = key.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<String>> {
            let mut conn = db.get_connection()?;

            let tx = conn.transaction().map_err(map_sql_error)?;
            let value: Option<String> = tx
                .query_row(
                    "SELECT value FROM session_values WHERE session_id = ?1 AND key = ?2",
                    params![session_id, key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_sql_error)?;
            if value.is_some() {
                tx.execute(
                    "DELETE FROM session_values WHERE session_id = ?1 AND key = ?2",
                    params![session_id, key],
                )
                .map_err(map_sql_error)?;
            }
            tx.commit().map_err(map_sql_error)?;
            Ok(value)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<u64> {
            let mut conn = db.get_connection()?;
            let now = to_millis(now);

            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute(
                "DELETE FROM session_values
                 WHERE session_id IN (SELECT id FROM sessions WHERE expires_at <= ?1)",
                params![now],
            )
            .map_err(map_sql_error)?;
            let purged = tx
                .execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])
                .map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;

            if purged > 0 {
                debug!(purged, "Expired sessions purged");
            }
            Ok(purged as u64)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Revoked refresh tokens
// =============================================================================

/// SQLite-backed implementation of `RevokedTokenRepository`
pub struct SqliteRevokedTokenRepository {
    db: Arc<DbManager>,
}

impl SqliteRevokedTokenRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RevokedTokenRepository for SqliteRevokedTokenRepository {
    async fn revoke(
        &self,
        token_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let token_id = token_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            // Revoking twice is harmless
            conn.execute(
                "INSERT OR IGNORE INTO revoked_tokens (token_id, user_id, expires_at, revoked_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![token_id, user_id, to_millis(expires_at), to_millis(Utc::now())],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn is_revoked(&self, token_id: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let token_id = token_id.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM revoked_tokens WHERE token_id = ?1",
                    params![token_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_sql_error)?;
            Ok(found.is_some())
        })
        .await
        .map_err(map_join_error)?
    }
}
