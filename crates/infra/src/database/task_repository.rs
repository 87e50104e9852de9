//! Task repository implementation using SQLite

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use projectflow_core::{TaskDraft, TaskRepository};
use projectflow_domain::{
    ProjectFlowError, ProjectId, Result as DomainResult, Task, TaskId, TaskStatus, UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;

use super::codec::{count, enum_column, map_join_error, optional_timestamp, timestamp, to_millis};
use super::manager::DbManager;
use crate::errors::map_sql_error;

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.priority, t.project_id, \
                            t.assignee_id, t.created_by, t.due_date, t.calendar_event_id, \
                            t.created_at, t.updated_at";

/// SQLite-backed implementation of `TaskRepository`
pub struct SqliteTaskRepository {
    db: Arc<DbManager>,
}

impl SqliteTaskRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, draft: TaskDraft) -> DomainResult<Task> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Task> {
            let conn = db.get_connection()?;
            let now = to_millis(Utc::now());

            conn.execute(
                "INSERT INTO tasks (title, description, status, priority, project_id, assignee_id,
                                    created_by, due_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    draft.title,
                    draft.description,
                    draft.status.as_str(),
                    draft.priority.as_str(),
                    draft.project_id,
                    draft.assignee_id,
                    draft.created_by,
                    draft.due_date.map(to_millis),
                    now
                ],
            )
            .map_err(map_sql_error)?;

            let id = conn.last_insert_rowid();
            select_task(&conn, id)?
                .ok_or_else(|| ProjectFlowError::Internal("inserted task vanished".into()))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_by_id(&self, id: TaskId) -> DomainResult<Option<Task>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Task>> {
            let conn = db.get_connection()?;
            select_task(&conn, id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_visible_to(&self, user_id: UserId) -> DomainResult<Vec<Task>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Task>> {
            let conn = db.get_connection()?;
            query_tasks(
                &conn,
                &format!(
                    "SELECT {TASK_COLUMNS}
                     FROM tasks t
                     JOIN project_members m ON m.project_id = t.project_id
                     WHERE m.user_id = ?1
                     ORDER BY t.created_at DESC, t.id DESC"
                ),
                user_id,
            )
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_by_project(&self, project_id: ProjectId) -> DomainResult<Vec<Task>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Task>> {
            let conn = db.get_connection()?;
            query_tasks(
                &conn,
                &format!(
                    "SELECT {TASK_COLUMNS} FROM tasks t WHERE t.project_id = ?1
                     ORDER BY t.created_at DESC, t.id DESC"
                ),
                project_id,
            )
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update(&self, task: &Task) -> DomainResult<Task> {
        let db = Arc::clone(&self.db);
        let task = task.clone();

        task::spawn_blocking(move || -> DomainResult<Task> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE tasks
                     SET title = ?1, description = ?2, status = ?3, priority = ?4,
                         assignee_id = ?5, due_date = ?6, updated_at = ?7
                     WHERE id = ?8",
                    params![
                        task.title,
                        task.description,
                        task.status.as_str(),
                        task.priority.as_str(),
                        task.assignee_id,
                        task.due_date.map(to_millis),
                        to_millis(Utc::now()),
                        task.id
                    ],
                )
                .map_err(map_sql_error)?;

            if updated == 0 {
                return Err(ProjectFlowError::NotFound(format!("task {}", task.id)));
            }
            select_task(&conn, task.id)?
                .ok_or_else(|| ProjectFlowError::NotFound(format!("task {}", task.id)))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_calendar_event_id(&self, task_id: TaskId, event_id: &str) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let event_id = event_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE tasks SET calendar_event_id = ?1 WHERE id = ?2",
                    params![event_id, task_id],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                return Err(ProjectFlowError::NotFound(format!("task {task_id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_cascade(&self, task_id: TaskId) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;

            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute("DELETE FROM comments WHERE task_id = ?1", params![task_id])
                .map_err(map_sql_error)?;
            let deleted = tx
                .execute("DELETE FROM tasks WHERE id = ?1", params![task_id])
                .map_err(map_sql_error)?;
            if deleted == 0 {
                return Err(ProjectFlowError::NotFound(format!("task {task_id}")));
            }
            tx.commit().map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn count_assigned(
        &self,
        user_id: UserId,
        status: Option<TaskStatus>,
    ) -> DomainResult<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<u64> {
            let conn = db.get_connection()?;
            let total: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM tasks
                     WHERE assignee_id = ?1 AND (?2 IS NULL OR status = ?2)",
                    params![user_id, status.map(|s| s.as_str())],
                    |row| row.get(0),
                )
                .map_err(map_sql_error)?;
            Ok(count(total))
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn select_task(conn: &Connection, id: TaskId) -> DomainResult<Option<Task>> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1"),
        params![id],
        map_task_row,
    )
    .optional()
    .map_err(map_sql_error)
}

fn query_tasks(conn: &Connection, sql: &str, key: i64) -> DomainResult<Vec<Task>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let tasks = stmt
        .query_map(params![key], map_task_row)
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(map_sql_error)?;
    Ok(tasks)
}

fn map_task_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: enum_column(row, 3)?,
        priority: enum_column(row, 4)?,
        project_id: row.get(5)?,
        assignee_id: row.get(6)?,
        created_by: row.get(7)?,
        due_date: optional_timestamp(row, 8)?,
        calendar_event_id: row.get(9)?,
        created_at: timestamp(row, 10)?,
        updated_at: timestamp(row, 11)?,
    })
}
