//! Project service - membership and creator rules

use std::collections::BTreeSet;
use std::sync::Arc;

use projectflow_common::validation::{StringValidator, ValidationError};
use projectflow_domain::constants::MAX_PROJECT_NAME_LENGTH;
use projectflow_domain::{
    KanbanBoard, MemberRef, NewProject, ProjectDetails, ProjectFlowError, ProjectId,
    ProjectUpdate, Result, TaskDetails, User, UserId, UserSummary,
};
use tracing::{info, warn};

use super::ports::{ProjectDraft, ProjectRepository};
use crate::access::{load_project, require_creator, require_member, visible_project};
use crate::accounts::ports::UserRepository;
use crate::comments::ports::CommentRepository;
use crate::details::DetailsBuilder;
use crate::tasks::ports::TaskRepository;

/// Project service
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
    details: DetailsBuilder,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        let details =
            DetailsBuilder::new(users.clone(), projects.clone(), tasks.clone(), comments);
        Self { projects, tasks, users, details }
    }

    /// Projects the user is a member of, newest first.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProjectDetails>> {
        let projects = self.projects.list_for_member(user_id).await?;
        self.details.projects(&projects).await
    }

    pub async fn get(&self, user_id: UserId, project_id: ProjectId) -> Result<ProjectDetails> {
        let project = visible_project(self.projects.as_ref(), user_id, project_id).await?;
        self.details.project(&project).await
    }

    /// Create a project owned by `user_id`.
    ///
    /// Members are the creator plus every id in `member_ids` that names an
    /// existing user; unknown ids are dropped without error.
    pub async fn create(&self, user_id: UserId, input: NewProject) -> Result<ProjectDetails> {
        let name = validate_name(&input.name)?;

        let mut members = self.existing_user_ids(&input.member_ids).await?;
        members.insert(user_id);

        let project = self
            .projects
            .create(ProjectDraft {
                name,
                description: input.description,
                created_by: user_id,
                members,
            })
            .await?;

        info!(project_id = project.id, user_id, members = project.members.len(), "Project created");
        self.details.project(&project).await
    }

    /// Update name/description (any member) and optionally replace the
    /// membership set (creator only). The creator is always re-added.
    pub async fn update(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        update: ProjectUpdate,
    ) -> Result<ProjectDetails> {
        let mut project = load_project(self.projects.as_ref(), project_id).await?;
        require_member(&project, user_id)?;

        if update.member_ids.is_some() {
            require_creator(&project, user_id, "change the member list")?;
        }

        if let Some(name) = update.name {
            project.name = validate_name(&name)?;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        let members = match update.member_ids {
            Some(member_ids) => {
                let members = self.existing_user_ids(&member_ids).await?;
                project.replace_members(members);
                Some(&project.members)
            }
            None => None,
        };

        let project = self.projects.update(&project, members).await?;
        self.details.project(&project).await
    }

    pub async fn add_member(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        target: MemberRef,
    ) -> Result<ProjectDetails> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_creator(&project, user_id, "add members")?;

        let member = self.resolve_member(&target).await?;
        self.projects.add_member(project.id, member.id).await?;

        info!(project_id, member_id = member.id, "Member added to project");
        self.get(user_id, project_id).await
    }

    /// Remove a member. The creator can never be removed; removing a
    /// non-member is a no-op.
    pub async fn remove_member(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        target: MemberRef,
    ) -> Result<ProjectDetails> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_creator(&project, user_id, "remove members")?;

        let member = self.resolve_member(&target).await?;
        if project.is_creator(member.id) {
            return Err(ProjectFlowError::InvalidOperation(
                "The project creator cannot be removed from the project".into(),
            ));
        }
        self.projects.remove_member(project.id, member.id).await?;

        info!(project_id, member_id = member.id, "Member removed from project");
        self.get(user_id, project_id).await
    }

    /// Delete a project with its tasks and comments. Creator only.
    pub async fn delete(&self, user_id: UserId, project_id: ProjectId) -> Result<()> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_creator(&project, user_id, "delete the project")?;

        let removed_tasks = self.projects.delete_cascade(project.id).await?;
        info!(project_id, removed_tasks, "Project deleted");
        Ok(())
    }

    /// Tasks grouped under every status, including empty columns.
    pub async fn kanban(&self, user_id: UserId, project_id: ProjectId) -> Result<KanbanBoard> {
        let tasks = self.tasks(user_id, project_id).await?;
        Ok(KanbanBoard::from_tasks(tasks))
    }

    /// Tasks of one project, newest first.
    pub async fn tasks(&self, user_id: UserId, project_id: ProjectId) -> Result<Vec<TaskDetails>> {
        let project = visible_project(self.projects.as_ref(), user_id, project_id).await?;
        let tasks = self.tasks.list_by_project(project.id).await?;
        self.details.tasks(&tasks).await
    }

    /// Every registered user, for member pickers.
    pub async fn all_users(&self) -> Result<Vec<UserSummary>> {
        let users = self.users.list_all().await?;
        Ok(users.iter().map(User::summary).collect())
    }

    async fn existing_user_ids(&self, ids: &[UserId]) -> Result<BTreeSet<UserId>> {
        if ids.is_empty() {
            return Ok(BTreeSet::new());
        }
        let found: BTreeSet<UserId> =
            self.users.get_many(ids).await?.into_iter().map(|user| user.id).collect();
        if found.len() < ids.iter().collect::<BTreeSet<_>>().len() {
            warn!(requested = ids.len(), found = found.len(), "Dropping unknown member ids");
        }
        Ok(found)
    }

    async fn resolve_member(&self, target: &MemberRef) -> Result<User> {
        let user = match target {
            MemberRef::Id(id) => self.users.get_by_id(*id).await?,
            MemberRef::Username(username) => self.users.get_by_username(username).await?,
        };
        user.ok_or_else(|| ProjectFlowError::NotFound(format!("User with {} not found", target)))
    }
}

fn validate_name(name: &str) -> Result<String> {
    let mut errors = ValidationError::new();
    errors.check("name", name, &StringValidator::new().not_empty().max_length(MAX_PROJECT_NAME_LENGTH));
    errors.into_result().map_err(|e| ProjectFlowError::Validation(e.to_string()))?;
    Ok(name.trim().to_string())
}
