//! Comment repository implementation using SQLite

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use projectflow_core::CommentRepository;
use projectflow_domain::{Comment, ProjectFlowError, Result as DomainResult, TaskId, UserId};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::codec::{count, map_join_error, timestamp, to_millis};
use super::manager::DbManager;
use crate::errors::map_sql_error;

/// SQLite-backed implementation of `CommentRepository`
pub struct SqliteCommentRepository {
    db: Arc<DbManager>,
}

impl SqliteCommentRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn create(&self, task_id: TaskId, author_id: UserId, text: &str) -> DomainResult<Comment> {
        let db = Arc::clone(&self.db);
        let text = text.to_string();

        task::spawn_blocking(move || -> DomainResult<Comment> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO comments (task_id, author_id, text, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![task_id, author_id, text, to_millis(Utc::now())],
            )
            .map_err(map_sql_error)?;

            conn.query_row(
                "SELECT id, task_id, author_id, text, created_at, updated_at
                 FROM comments WHERE id = ?1",
                params![conn.last_insert_rowid()],
                map_comment_row,
            )
            .optional()
            .map_err(map_sql_error)?
            .ok_or_else(|| ProjectFlowError::Internal("inserted comment vanished".into()))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_for_task(&self, task_id: TaskId) -> DomainResult<Vec<Comment>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Comment>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, task_id, author_id, text, created_at, updated_at
                     FROM comments WHERE task_id = ?1
                     ORDER BY created_at ASC, id ASC",
                )
                .map_err(map_sql_error)?;

            let comments = stmt
                .query_map(params![task_id], map_comment_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(comments)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn count_for_task(&self, task_id: TaskId) -> DomainResult<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<u64> {
            let conn = db.get_connection()?;
            let total: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM comments WHERE task_id = ?1",
                    params![task_id],
                    |row| row.get(0),
                )
                .map_err(map_sql_error)?;
            Ok(count(total))
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_comment_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        task_id: row.get(1)?,
        author_id: row.get(2)?,
        text: row.get(3)?,
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}
