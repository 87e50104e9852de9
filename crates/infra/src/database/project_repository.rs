//! Project repository implementation using SQLite
//!
//! Membership lives in `project_members`. A project update rewrites it only
//! when the caller hands over a replacement set; that rewrite shares the
//! transaction with the project row.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use projectflow_core::{ProjectDraft, ProjectRepository};
use projectflow_domain::{Project, ProjectFlowError, ProjectId, Result as DomainResult, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::debug;

use super::codec::{count, map_join_error, timestamp, to_millis};
use super::manager::DbManager;
use crate::errors::map_sql_error;

const PROJECT_COLUMNS: &str = "p.id, p.name, p.description, p.created_by, p.created_at, p.updated_at";

/// SQLite-backed implementation of `ProjectRepository`
pub struct SqliteProjectRepository {
    db: Arc<DbManager>,
}

impl SqliteProjectRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn create(&self, draft: ProjectDraft) -> DomainResult<Project> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Project> {
            let mut conn = db.get_connection()?;
            let now = to_millis(Utc::now());

            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute(
                "INSERT INTO projects (name, description, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![draft.name, draft.description, draft.created_by, now],
            )
            .map_err(map_sql_error)?;
            let project_id = tx.last_insert_rowid();

            let mut members = draft.members;
            members.insert(draft.created_by);
            insert_members(&tx, project_id, &members)?;

            let project = select_project(&tx, project_id)?
                .ok_or_else(|| ProjectFlowError::Internal("inserted project vanished".into()))?;
            tx.commit().map_err(map_sql_error)?;

            Ok(project)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_by_id(&self, id: ProjectId) -> DomainResult<Option<Project>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Project>> {
            let conn = db.get_connection()?;
            select_project(&conn, id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_for_member(&self, user_id: UserId) -> DomainResult<Vec<Project>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Project>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {PROJECT_COLUMNS}
                     FROM projects p
                     JOIN project_members m ON m.project_id = p.id
                     WHERE m.user_id = ?1
                     ORDER BY p.created_at DESC, p.id DESC"
                ))
                .map_err(map_sql_error)?;

            let rows = stmt
                .query_map(params![user_id], map_project_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            rows.into_iter()
                .map(|mut project| {
                    project.members = select_members(&conn, project.id)?;
                    Ok(project)
                })
                .collect()
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update(
        &self,
        project: &Project,
        members: Option<&BTreeSet<UserId>>,
    ) -> DomainResult<Project> {
        let db = Arc::clone(&self.db);
        let project = project.clone();
        let members = members.cloned();

        task::spawn_blocking(move || -> DomainResult<Project> {
            let mut conn = db.get_connection()?;

            let tx = conn.transaction().map_err(map_sql_error)?;
            let updated = tx
                .execute(
                    "UPDATE projects SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                    params![project.name, project.description, to_millis(Utc::now()), project.id],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                return Err(ProjectFlowError::NotFound(format!("project {}", project.id)));
            }

            if let Some(mut members) = members {
                tx.execute(
                    "DELETE FROM project_members WHERE project_id = ?1",
                    params![project.id],
                )
                .map_err(map_sql_error)?;
                members.insert(project.created_by);
                insert_members(&tx, project.id, &members)?;
            }

            let saved = select_project(&tx, project.id)?
                .ok_or_else(|| ProjectFlowError::NotFound(format!("project {}", project.id)))?;
            tx.commit().map_err(map_sql_error)?;

            Ok(saved)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn add_member(&self, project_id: ProjectId, user_id: UserId) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR IGNORE INTO project_members (project_id, user_id) VALUES (?1, ?2)",
                params![project_id, user_id],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn remove_member(&self, project_id: ProjectId, user_id: UserId) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_cascade(&self, project_id: ProjectId) -> DomainResult<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<u64> {
            let mut conn = db.get_connection()?;

            let tx = conn.transaction().map_err(map_sql_error)?;
            let comments = tx
                .execute(
                    "DELETE FROM comments
                     WHERE task_id IN (SELECT id FROM tasks WHERE project_id = ?1)",
                    params![project_id],
                )
                .map_err(map_sql_error)?;
            let tasks = tx
                .execute("DELETE FROM tasks WHERE project_id = ?1", params![project_id])
                .map_err(map_sql_error)?;
            tx.execute("DELETE FROM project_members WHERE project_id = ?1", params![project_id])
                .map_err(map_sql_error)?;
            let projects = tx
                .execute("DELETE FROM projects WHERE id = ?1", params![project_id])
                .map_err(map_sql_error)?;

            if projects == 0 {
                return Err(ProjectFlowError::NotFound(format!("project {project_id}")));
            }
            tx.commit().map_err(map_sql_error)?;

            debug!(project_id, tasks, comments, "Project deleted with its tasks and comments");
            Ok(tasks as u64)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn count_for_member(&self, user_id: UserId) -> DomainResult<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<u64> {
            let conn = db.get_connection()?;
            let total: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM project_members WHERE user_id = ?1",
                    params![user_id],
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

fn insert_members(
    conn: &Connection,
    project_id: ProjectId,
    members: &BTreeSet<UserId>,
) -> DomainResult<()> {
    let mut stmt = conn
        .prepare("INSERT OR IGNORE INTO project_members (project_id, user_id) VALUES (?1, ?2)")
        .map_err(map_sql_error)?;
    for user_id in members {
        stmt.execute(params![project_id, user_id]).map_err(map_sql_error)?;
    }
    Ok(())
}

fn select_members(conn: &Connection, project_id: ProjectId) -> DomainResult<BTreeSet<UserId>> {
    let mut stmt = conn
        .prepare("SELECT user_id FROM project_members WHERE project_id = ?1")
        .map_err(map_sql_error)?;
    let members = stmt
        .query_map(params![project_id], |row| row.get::<_, UserId>(0))
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .map_err(map_sql_error)?;
    Ok(members)
}

fn select_project(conn: &Connection, id: ProjectId) -> DomainResult<Option<Project>> {
    let project = conn
        .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?1"),
            params![id],
            map_project_row,
        )
        .optional()
        .map_err(map_sql_error)?;

    match project {
        Some(mut project) => {
            project.members = select_members(conn, project.id)?;
            Ok(Some(project))
        }
        None => Ok(None),
    }
}

/// Members are loaded separately.
fn map_project_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_by: row.get(3)?,
        members: BTreeSet::new(),
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}
