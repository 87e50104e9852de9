#![allow(dead_code)]

use std::sync::Arc;

use projectflow_core::UserRepository;
use projectflow_domain::{NewUser, User};
use projectflow_infra::database::{DbManager, SqliteUserRepository};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with migrations applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("infra-integration.db");

        let manager = DbManager::new(&db_path, 4, 2000).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Count rows of `table`.
    pub fn count(&self, table: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Register `username` with a placeholder password hash.
pub async fn seed_user(db: &TestDatabase, username: &str) -> User {
    let repo = SqliteUserRepository::new(Arc::clone(&db.manager));
    let (user, _) = repo
        .create_with_profile(
            NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: String::new(),
                last_name: String::new(),
            },
            "unused-hash".to_string(),
        )
        .await
        .expect("user should be created");
    user
}
