//! Port interfaces for project persistence

use std::collections::BTreeSet;

use async_trait::async_trait;
use projectflow_domain::{Project, ProjectId, Result, UserId};

/// Fields for a project insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    /// Must contain `created_by`
    pub members: BTreeSet<UserId>,
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert the project and its membership rows together.
    async fn create(&self, draft: ProjectDraft) -> Result<Project>;

    async fn get_by_id(&self, id: ProjectId) -> Result<Option<Project>>;

    /// Projects `user_id` belongs to, newest first.
    async fn list_for_member(&self, user_id: UserId) -> Result<Vec<Project>>;

    /// Persist name and description. The stored membership is left alone
    /// unless `members` is given, in which case it is replaced in the same
    /// transaction (the creator is always kept).
    async fn update(&self, project: &Project, members: Option<&BTreeSet<UserId>>)
        -> Result<Project>;

    /// No-op when already a member.
    async fn add_member(&self, project_id: ProjectId, user_id: UserId) -> Result<()>;

    async fn remove_member(&self, project_id: ProjectId, user_id: UserId) -> Result<()>;

    /// Delete the project, its tasks and their comments in one transaction.
    ///
    /// Returns the number of tasks removed.
    async fn delete_cascade(&self, project_id: ProjectId) -> Result<u64>;

    async fn count_for_member(&self, user_id: UserId) -> Result<u64>;
}
