//! Task list filters and ordering
//!
//! Every filter is an independent predicate; a task is listed when all of
//! them hold.

use std::cmp::Ordering;
use std::str::FromStr;

use projectflow_domain::{ProjectId, Task, TaskPriority, TaskStatus, UserId};

/// Filters accepted by the task list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub project: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to_me: bool,
    pub created_by_me: bool,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub ordering: TaskOrdering,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task, viewer: UserId) -> bool {
        self.project.map_or(true, |project| task.project_id == project)
            && self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
            && (!self.assigned_to_me || task.assignee_id == Some(viewer))
            && (!self.created_by_me || task.created_by == viewer)
            && self.matches_search(task)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        task.title.to_lowercase().contains(&term) || task.description.to_lowercase().contains(&term)
    }

    /// Narrow `tasks` to the matching ones and sort them.
    pub fn apply(&self, tasks: Vec<Task>, viewer: UserId) -> Vec<Task> {
        let mut tasks: Vec<Task> = tasks.into_iter().filter(|t| self.matches(t, viewer)).collect();
        self.ordering.sort(&mut tasks);
        tasks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    CreatedAt,
    DueDate,
    Priority,
    Status,
}

/// Sort key with direction; defaults to newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOrdering {
    pub field: TaskSortField,
    pub descending: bool,
}

impl Default for TaskOrdering {
    fn default() -> Self {
        Self { field: TaskSortField::CreatedAt, descending: true }
    }
}

impl TaskOrdering {
    /// Stable sort; ties keep newest first and then the highest id.
    pub fn sort(&self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| {
            let primary = match self.field {
                TaskSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                // No due date sorts before any date
                TaskSortField::DueDate => a.due_date.cmp(&b.due_date),
                TaskSortField::Priority => a.priority.cmp(&b.priority),
                TaskSortField::Status => a.status.cmp(&b.status),
            };
            let primary = if self.descending { primary.reverse() } else { primary };
            primary.then_with(|| tie_break(a, b))
        });
    }
}

fn tie_break(a: &Task, b: &Task) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

impl FromStr for TaskOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let field = match name {
            "created_at" => TaskSortField::CreatedAt,
            "due_date" => TaskSortField::DueDate,
            "priority" => TaskSortField::Priority,
            "status" => TaskSortField::Status,
            other => return Err(format!("Cannot order tasks by '{}'", other)),
        };
        Ok(Self { field, descending })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn task(id: i64, project_id: i64) -> Task {
        Task {
            id,
            title: format!("Task {}", id),
            description: String::new(),
            status: TaskStatus::New,
            priority: TaskPriority::None,
            project_id,
            assignee_id: None,
            created_by: 1,
            due_date: None,
            calendar_event_id: None,
            created_at: at(id),
            updated_at: at(id),
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = TaskQuery::default();
        assert!(query.matches(&task(1, 1), 9));
    }

    #[test]
    fn filters_are_conjunctive() {
        let mut t = task(1, 2);
        t.status = TaskStatus::InProgress;
        t.assignee_id = Some(5);

        let query = TaskQuery {
            project: Some(2),
            status: Some(TaskStatus::InProgress),
            assigned_to_me: true,
            ..TaskQuery::default()
        };
        assert!(query.matches(&t, 5));
        assert!(!query.matches(&t, 6));

        let wrong_project = TaskQuery { project: Some(3), ..query.clone() };
        assert!(!wrong_project.matches(&t, 5));
    }

    #[test]
    fn created_by_me_uses_viewer() {
        let query = TaskQuery { created_by_me: true, ..TaskQuery::default() };
        assert!(query.matches(&task(1, 1), 1));
        assert!(!query.matches(&task(1, 1), 2));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let mut t = task(1, 1);
        t.title = "Prepare Release".into();
        t.description = "Tag the build".into();

        let by_title = TaskQuery { search: Some("release".into()), ..TaskQuery::default() };
        let by_description = TaskQuery { search: Some("BUILD".into()), ..TaskQuery::default() };
        let miss = TaskQuery { search: Some("deploy".into()), ..TaskQuery::default() };
        let blank = TaskQuery { search: Some("  ".into()), ..TaskQuery::default() };

        assert!(by_title.matches(&t, 1));
        assert!(by_description.matches(&t, 1));
        assert!(!miss.matches(&t, 1));
        assert!(blank.matches(&t, 1));
    }

    #[test]
    fn default_ordering_is_newest_first() {
        let tasks = vec![task(1, 1), task(3, 1), task(2, 1)];
        let ids: Vec<i64> =
            TaskQuery::default().apply(tasks, 1).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn priority_ordering_is_most_urgent_first() {
        let mut low = task(1, 1);
        low.priority = TaskPriority::Low;
        let mut critical = task(2, 1);
        critical.priority = TaskPriority::Critical;
        let none = task(3, 1);

        let mut tasks = vec![low, critical, none];
        "priority".parse::<TaskOrdering>().unwrap().sort(&mut tasks);
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn due_date_ordering_puts_missing_dates_first() {
        let mut soon = task(1, 1);
        soon.due_date = Some(at(10));
        let mut later = task(2, 1);
        later.due_date = Some(at(20));
        let undated = task(3, 1);

        let mut tasks = vec![later.clone(), undated.clone(), soon.clone()];
        "due_date".parse::<TaskOrdering>().unwrap().sort(&mut tasks);
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 1, 2]);

        "-due_date".parse::<TaskOrdering>().unwrap().sort(&mut tasks);
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1, 3]);
    }

    #[test]
    fn unknown_ordering_is_rejected() {
        assert!("title".parse::<TaskOrdering>().is_err());
        assert!("-".parse::<TaskOrdering>().is_err());
    }
}
