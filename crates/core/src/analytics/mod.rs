//! Read-side aggregation for the dashboard charts

use std::collections::BTreeMap;
use std::sync::Arc;

use projectflow_domain::{
    ChartSeries, ProjectFlowError, ProjectId, ProjectProgress, Result, Task, TaskStatus, UserId,
};

use crate::access::{load_project, require_member};
use crate::accounts::ports::UserRepository;
use crate::projects::ports::ProjectRepository;
use crate::tasks::ports::TaskRepository;

/// Fixed chart colour per status
pub fn status_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::New => "rgba(54, 162, 235, 0.6)",
        TaskStatus::InProgress => "rgba(255, 206, 86, 0.6)",
        TaskStatus::InReview => "rgba(75, 192, 192, 0.6)",
        TaskStatus::Done => "rgba(153, 102, 255, 0.6)",
    }
}

/// Stable colour derived from `label`; the same label always gets the same colour.
pub fn label_color(label: &str) -> String {
    let hash = blake3::hash(label.as_bytes());
    let bytes = hash.as_bytes();
    format!("rgba({}, {}, {}, 0.6)", bytes[0], bytes[1], bytes[2])
}

/// Analytics service
pub struct AnalyticsService {
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
}

impl AnalyticsService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { tasks, projects, users }
    }

    /// Task counts for every status, in fixed order, zeros included.
    pub async fn tasks_by_status(
        &self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<ChartSeries> {
        let tasks = self.scoped_tasks(user_id, project_id).await?;

        let mut series = ChartSeries::default();
        for status in TaskStatus::ALL {
            let count = tasks.iter().filter(|task| task.status == *status).count() as u64;
            series.push(status.display_name(), count, status_color(*status));
        }
        Ok(series)
    }

    /// Task counts per assignee, ordered by username. Unassigned tasks are skipped.
    pub async fn tasks_by_user(
        &self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<ChartSeries> {
        let tasks = self.scoped_tasks(user_id, project_id).await?;

        let mut counts: BTreeMap<UserId, u64> = BTreeMap::new();
        for assignee in tasks.iter().filter_map(|task| task.assignee_id) {
            *counts.entry(assignee).or_default() += 1;
        }

        let ids: Vec<UserId> = counts.keys().copied().collect();
        let mut users = self.users.get_many(&ids).await?;
        users.sort_by(|a, b| a.username.cmp(&b.username));

        let mut series = ChartSeries::default();
        for user in users {
            let count = counts.get(&user.id).copied().unwrap_or_default();
            let color = label_color(&user.username);
            series.push(user.username, count, color);
        }
        Ok(series)
    }

    pub async fn project_progress(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<ProjectProgress> {
        let tasks = self.scoped_tasks(user_id, Some(project_id)).await?;
        let completed = tasks.iter().filter(|task| task.status == TaskStatus::Done).count();
        Ok(ProjectProgress::new(tasks.len() as u64, completed as u64))
    }

    /// Tasks of one project (caller must be a member) or every visible task.
    async fn scoped_tasks(
        &self,
        user_id: UserId,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Task>> {
        match project_id {
            Some(project_id) => {
                let project = load_project(self.projects.as_ref(), project_id).await?;
                require_member(&project, user_id).map_err(|_| {
                    ProjectFlowError::Permission("You do not have access to this project".into())
                })?;
                self.tasks.list_by_project(project.id).await
            }
            None => self.tasks.list_visible_to(user_id).await,
        }
    }
}
