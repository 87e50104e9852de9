//! Assembly of client-facing read models.
//!
//! Derived values (`is_overdue`, counts, progress) are computed here on every
//! read; users are resolved in one batch per call.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use projectflow_domain::{
    Comment, CommentDetails, Project, ProjectDetails, ProjectFlowError, ProjectId, Result, Task,
    TaskDetails, TaskStatus, User, UserId,
};

use crate::accounts::ports::UserRepository;
use crate::comments::ports::CommentRepository;
use crate::projects::ports::ProjectRepository;
use crate::tasks::ports::TaskRepository;

#[derive(Clone)]
pub(crate) struct DetailsBuilder {
    users: Arc<dyn UserRepository>,
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl DetailsBuilder {
    pub(crate) fn new(
        users: Arc<dyn UserRepository>,
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self { users, projects, tasks, comments }
    }

    async fn users_by_id(&self, ids: BTreeSet<UserId>) -> Result<HashMap<UserId, User>> {
        let ids: Vec<UserId> = ids.into_iter().collect();
        let users = self.users.get_many(&ids).await?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }

    pub(crate) async fn project(&self, project: &Project) -> Result<ProjectDetails> {
        self.projects(std::slice::from_ref(project)).await?.into_iter().next().ok_or_else(|| {
            ProjectFlowError::Internal(format!("Project {} vanished", project.id))
        })
    }

    pub(crate) async fn projects(&self, projects: &[Project]) -> Result<Vec<ProjectDetails>> {
        let ids: BTreeSet<UserId> = projects
            .iter()
            .flat_map(|p| p.members.iter().copied().chain(std::iter::once(p.created_by)))
            .collect();
        let users = self.users_by_id(ids).await?;

        let mut details = Vec::with_capacity(projects.len());
        for project in projects {
            let creator = users.get(&project.created_by).ok_or_else(|| {
                ProjectFlowError::Internal(format!("Creator of project {} missing", project.id))
            })?;
            let members: Vec<User> =
                project.members.iter().filter_map(|id| users.get(id).cloned()).collect();

            let tasks = self.tasks.list_by_project(project.id).await?;
            let total = tasks.len() as u64;
            let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count() as u64;

            details.push(ProjectDetails::new(project, creator, &members, total, done));
        }
        Ok(details)
    }

    pub(crate) async fn task(&self, task: &Task) -> Result<TaskDetails> {
        self.tasks(std::slice::from_ref(task)).await?.into_iter().next().ok_or_else(|| {
            ProjectFlowError::Internal(format!("Task {} vanished", task.id))
        })
    }

    pub(crate) async fn tasks(&self, tasks: &[Task]) -> Result<Vec<TaskDetails>> {
        let user_ids: BTreeSet<UserId> = tasks
            .iter()
            .flat_map(|t| t.assignee_id.into_iter().chain(std::iter::once(t.created_by)))
            .collect();
        let users = self.users_by_id(user_ids).await?;

        let mut project_names: HashMap<ProjectId, String> = HashMap::new();
        for project_id in tasks.iter().map(|t| t.project_id).collect::<BTreeSet<_>>() {
            if let Some(project) = self.projects.get_by_id(project_id).await? {
                project_names.insert(project_id, project.name);
            }
        }

        let now = Utc::now();
        let mut details = Vec::with_capacity(tasks.len());
        for task in tasks {
            let creator = users.get(&task.created_by).ok_or_else(|| {
                ProjectFlowError::Internal(format!("Creator of task {} missing", task.id))
            })?;
            let assignee = task.assignee_id.and_then(|id| users.get(&id));
            let project_name =
                project_names.get(&task.project_id).map(String::as_str).unwrap_or_default();
            let comments_count = self.comments.count_for_task(task.id).await?;

            details.push(TaskDetails::new(task, project_name, assignee, creator, comments_count, now));
        }
        Ok(details)
    }

    pub(crate) async fn comments(&self, comments: &[Comment]) -> Result<Vec<CommentDetails>> {
        let ids: BTreeSet<UserId> = comments.iter().map(|c| c.author_id).collect();
        let users = self.users_by_id(ids).await?;

        comments
            .iter()
            .map(|comment| {
                users
                    .get(&comment.author_id)
                    .map(|author| CommentDetails::new(comment, author))
                    .ok_or_else(|| {
                        ProjectFlowError::Internal(format!(
                            "Author of comment {} missing",
                            comment.id
                        ))
                    })
            })
            .collect()
    }
}
