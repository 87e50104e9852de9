//! User and profile repository implementation using SQLite
//!
//! A user row and its profile row are always written together; the profile
//! carries the calendar OAuth token triple.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use projectflow_core::{ProfileRepository, UserRepository};
use projectflow_domain::{
    CalendarCredentials, NewUser, Profile, ProjectFlowError, Result as DomainResult, User, UserId,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tokio::task;

use super::codec::{map_join_error, optional_timestamp, timestamp, to_millis};
use super::manager::DbManager;
use crate::errors::map_sql_error;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, date_joined";
const PROFILE_COLUMNS: &str = "id, user_id, calendar_access_token, calendar_refresh_token, \
                               calendar_token_expiry, created_at, updated_at";

/// SQLite-backed implementation of `UserRepository` and `ProfileRepository`
pub struct SqliteUserRepository {
    db: Arc<DbManager>,
}

impl SqliteUserRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

// =============================================================================
// UserRepository
// =============================================================================

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_with_profile(
        &self,
        user: NewUser,
        password_hash: String,
    ) -> DomainResult<(User, Profile)> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<(User, Profile)> {
            let mut conn = db.get_connection()?;
            let now = to_millis(Utc::now());

            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute(
                "INSERT INTO users (username, email, password_hash, first_name, last_name, date_joined)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![user.username, user.email, password_hash, user.first_name, user.last_name, now],
            )
            .map_err(map_sql_error)?;
            let user_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO profiles (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)",
                params![user_id, now],
            )
            .map_err(map_sql_error)?;

            let created = select_user(&tx, user_id)?
                .ok_or_else(|| ProjectFlowError::Internal("inserted user vanished".into()))?;
            let profile = select_profile(&tx, user_id)?
                .ok_or_else(|| ProjectFlowError::Internal("inserted profile vanished".into()))?;
            tx.commit().map_err(map_sql_error)?;

            Ok((created, profile))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<User>> {
            let conn = db.get_connection()?;
            select_user(&conn, id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let db = Arc::clone(&self.db);
        let username = username.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<User>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                map_user_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let db = Arc::clone(&self.db);
        let email = email.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<User>> {
            let conn = db.get_connection()?;
            // email column is COLLATE NOCASE
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                map_user_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_credentials(&self, username: &str) -> DomainResult<Option<(User, String)>> {
        let db = Arc::clone(&self.db);
        let username = username.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<(User, String)>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"),
                params![username],
                |row| Ok((map_user_row(row)?, row.get(6)?)),
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_many(&self, ids: &[UserId]) -> DomainResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let db = Arc::clone(&self.db);
        let ids = ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<Vec<User>> {
            let conn = db.get_connection()?;
            let placeholders = vec!["?"; ids.len()].join(", ");
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id IN ({placeholders}) ORDER BY username"
                ))
                .map_err(map_sql_error)?;

            let users = stmt
                .query_map(params_from_iter(ids.iter()), map_user_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(users)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_all(&self) -> DomainResult<Vec<User>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<User>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))
                .map_err(map_sql_error)?;

            let users = stmt
                .query_map([], map_user_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(users)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// ProfileRepository
// =============================================================================

#[async_trait]
impl ProfileRepository for SqliteUserRepository {
    async fn get_by_user(&self, user_id: UserId) -> DomainResult<Option<Profile>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Profile>> {
            let conn = db.get_connection()?;
            select_profile(&conn, user_id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_calendar_credentials(
        &self,
        user_id: UserId,
        credentials: &CalendarCredentials,
    ) -> DomainResult<Profile> {
        let db = Arc::clone(&self.db);
        let credentials = credentials.clone();

        task::spawn_blocking(move || -> DomainResult<Profile> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE profiles
                     SET calendar_access_token = ?1, calendar_refresh_token = ?2,
                         calendar_token_expiry = ?3, updated_at = ?4
                     WHERE user_id = ?5",
                    params![
                        credentials.access_token,
                        credentials.refresh_token,
                        credentials.expires_at.map(to_millis),
                        to_millis(Utc::now()),
                        user_id
                    ],
                )
                .map_err(map_sql_error)?;

            if updated == 0 {
                return Err(ProjectFlowError::NotFound(format!("profile for user {user_id}")));
            }

            select_profile(&conn, user_id)?
                .ok_or_else(|| ProjectFlowError::NotFound(format!("profile for user {user_id}")))
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn select_user(conn: &Connection, id: UserId) -> DomainResult<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        map_user_row,
    )
    .optional()
    .map_err(map_sql_error)
}

fn select_profile(conn: &Connection, user_id: UserId) -> DomainResult<Option<Profile>> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
        params![user_id],
        map_profile_row,
    )
    .optional()
    .map_err(map_sql_error)
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        date_joined: timestamp(row, 5)?,
    })
}

fn map_profile_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        calendar_access_token: row.get(2)?,
        calendar_refresh_token: row.get(3)?,
        calendar_token_expiry: optional_timestamp(row, 4)?,
        created_at: timestamp(row, 5)?,
        updated_at: timestamp(row, 6)?,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::{Duration, SubsecRound};
    use tempfile::TempDir;

    use super::*;

    fn setup_test_db() -> (Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("create temp dir");
        let manager =
            DbManager::new(temp_dir.path().join("test.db"), 4, 1000).expect("create db manager");
        manager.run_migrations().expect("run migrations");
        (Arc::new(manager), temp_dir)
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_with_profile_writes_both_rows() {
        let (db, _dir) = setup_test_db();
        let repo = SqliteUserRepository::new(db);

        let (user, profile) =
            repo.create_with_profile(new_user("ada", "ada@example.com"), "hash".into()).await.unwrap();

        assert_eq!(profile.user_id, user.id);
        assert!(!profile.has_calendar_access());
        assert_eq!(repo.get_by_id(user.id).await.unwrap(), Some(user.clone()));

        let (found, hash) = repo.get_credentials("ada").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(hash, "hash");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn duplicate_username_is_validation_error_and_leaves_no_profile() {
        let (db, _dir) = setup_test_db();
        let repo = SqliteUserRepository::new(Arc::clone(&db));

        repo.create_with_profile(new_user("ada", "ada@example.com"), "h".into()).await.unwrap();
        let err = repo
            .create_with_profile(new_user("ada", "other@example.com"), "h".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::Validation(_)));

        let conn = db.get_connection().unwrap();
        let profiles: i64 =
            conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0)).unwrap();
        assert_eq!(profiles, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn email_lookup_ignores_case() {
        let (db, _dir) = setup_test_db();
        let repo = SqliteUserRepository::new(db);
        repo.create_with_profile(new_user("ada", "ada@example.com"), "h".into()).await.unwrap();

        let found = repo.get_by_email("ADA@Example.COM").await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("ada".to_string()));
        assert!(repo.get_by_username("ADA").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_many_skips_unknown_ids_and_list_all_sorts_by_username() {
        let (db, _dir) = setup_test_db();
        let repo = SqliteUserRepository::new(db);
        let (zed, _) = repo.create_with_profile(new_user("zed", "z@example.com"), "h".into()).await.unwrap();
        let (amy, _) = repo.create_with_profile(new_user("amy", "a@example.com"), "h".into()).await.unwrap();

        let many = repo.get_many(&[zed.id, 999, amy.id]).await.unwrap();
        assert_eq!(many.iter().map(|u| u.id).collect::<Vec<_>>(), vec![amy.id, zed.id]);
        assert!(repo.get_many(&[]).await.unwrap().is_empty());

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(), vec!["amy", "zed"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn save_calendar_credentials_overwrites_triple() {
        let (db, _dir) = setup_test_db();
        let repo = SqliteUserRepository::new(db);
        let (user, _) = repo.create_with_profile(new_user("ada", "ada@example.com"), "h".into()).await.unwrap();
        let expiry = (Utc::now() + Duration::hours(1)).trunc_subsecs(3);

        let profile = repo
            .save_calendar_credentials(
                user.id,
                &CalendarCredentials {
                    access_token: "access".into(),
                    refresh_token: Some("refresh".into()),
                    expires_at: Some(expiry),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.calendar_access_token.as_deref(), Some("access"));
        assert_eq!(profile.calendar_refresh_token.as_deref(), Some("refresh"));
        assert_eq!(profile.calendar_token_expiry, Some(expiry));
        assert_eq!(repo.get_by_user(user.id).await.unwrap(), Some(profile));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn save_calendar_credentials_for_unknown_user_is_not_found() {
        let (db, _dir) = setup_test_db();
        let repo = SqliteUserRepository::new(db);

        let err = repo
            .save_calendar_credentials(
                42,
                &CalendarCredentials { access_token: "a".into(), refresh_token: None, expires_at: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::NotFound(_)));
    }
}
