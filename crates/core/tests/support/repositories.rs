//! In-memory implementations of the core repository ports
//!
//! A single [`InMemoryStore`] backs every repository so cascades and
//! membership-scoped queries behave like the SQLite adapters.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use projectflow_core::projects::ports::ProjectDraft;
use projectflow_core::tasks::ports::TaskDraft;
use projectflow_core::{
    CommentRepository, ProfileRepository, ProjectRepository, RevokedTokenRepository,
    SessionStore, TaskRepository, UserRepository,
};
use projectflow_domain::{
    CalendarCredentials, Comment, NewUser, Profile, Project, ProjectFlowError, ProjectId,
    Result as DomainResult, Task, TaskId, TaskStatus, User, UserId,
};

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<UserId, (User, String)>,
    profiles: BTreeMap<UserId, Profile>,
    projects: BTreeMap<ProjectId, Project>,
    tasks: BTreeMap<TaskId, Task>,
    comments: Vec<Comment>,
    sessions: HashMap<String, (UserId, DateTime<Utc>)>,
    session_values: HashMap<(String, String), String>,
    revoked: HashSet<String>,
    profile_writes: usize,
}

impl State {
    /// Ids and timestamps both increase, so "newest first" is deterministic.
    fn next(&mut self) -> (i64, DateTime<Utc>) {
        self.next_id += 1;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (self.next_id, base + Duration::seconds(self.next_id))
    }
}

/// Shared in-memory backing for every repository port.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calendar credential writes, for asserting a profile was untouched.
    pub fn profile_writes(&self) -> usize {
        self.state.lock().profile_writes
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.state.lock().tasks.get(&id).cloned()
    }

    pub fn profile(&self, user_id: UserId) -> Option<Profile> {
        self.state.lock().profiles.get(&user_id).cloned()
    }

    pub fn comment_count(&self) -> usize {
        self.state.lock().comments.len()
    }

    pub fn session_value(&self, session_id: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .session_values
            .get(&(session_id.to_string(), key.to_string()))
            .cloned()
    }

    /// Store calendar credentials directly, bypassing the OAuth flow.
    pub fn connect_calendar(&self, user_id: UserId, credentials: CalendarCredentials) {
        let mut state = self.state.lock();
        if let Some(profile) = state.profiles.get_mut(&user_id) {
            profile.calendar_access_token = Some(credentials.access_token);
            profile.calendar_refresh_token = credentials.refresh_token;
            profile.calendar_token_expiry = credentials.expires_at;
        }
    }
}

// ============================================================================
// Users and profiles
// ============================================================================

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_with_profile(
        &self,
        user: NewUser,
        password_hash: String,
    ) -> DomainResult<(User, Profile)> {
        let mut state = self.state.lock();
        if state.users.values().any(|(u, _)| u.username == user.username) {
            return Err(ProjectFlowError::Validation("username already exists".into()));
        }
        let (id, now) = state.next();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: now,
        };
        let profile = Profile {
            id,
            user_id: id,
            calendar_access_token: None,
            calendar_refresh_token: None,
            calendar_token_expiry: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, (user.clone(), password_hash));
        state.profiles.insert(id, profile.clone());
        Ok((user, profile))
    }

    async fn get_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        Ok(self.state.lock().users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn get_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .users
            .values()
            .find(|(user, _)| user.username == username)
            .map(|(user, _)| user.clone()))
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .users
            .values()
            .find(|(user, _)| user.email.eq_ignore_ascii_case(email))
            .map(|(user, _)| user.clone()))
    }

    async fn get_credentials(&self, username: &str) -> DomainResult<Option<(User, String)>> {
        Ok(self.state.lock().users.values().find(|(user, _)| user.username == username).cloned())
    }

    async fn get_many(&self, ids: &[UserId]) -> DomainResult<Vec<User>> {
        let state = self.state.lock();
        Ok(ids.iter().filter_map(|id| state.users.get(id).map(|(user, _)| user.clone())).collect())
    }

    async fn list_all(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> =
            self.state.lock().users.values().map(|(user, _)| user.clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn get_by_user(&self, user_id: UserId) -> DomainResult<Option<Profile>> {
        Ok(self.state.lock().profiles.get(&user_id).cloned())
    }

    async fn save_calendar_credentials(
        &self,
        user_id: UserId,
        credentials: &CalendarCredentials,
    ) -> DomainResult<Profile> {
        let mut state = self.state.lock();
        state.profile_writes += 1;
        let profile = state
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| ProjectFlowError::NotFound(format!("Profile of {}", user_id)))?;
        profile.calendar_access_token = Some(credentials.access_token.clone());
        profile.calendar_refresh_token = credentials.refresh_token.clone();
        profile.calendar_token_expiry = credentials.expires_at;
        Ok(profile.clone())
    }
}

#[async_trait]
impl RevokedTokenRepository for InMemoryStore {
    async fn revoke(
        &self,
        token_id: &str,
        _user_id: UserId,
        _expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.state.lock().revoked.insert(token_id.to_string());
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> DomainResult<bool> {
        Ok(self.state.lock().revoked.contains(token_id))
    }
}

// ============================================================================
// Projects, tasks and comments
// ============================================================================

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn create(&self, draft: ProjectDraft) -> DomainResult<Project> {
        let mut state = self.state.lock();
        let (id, now) = state.next();
        let project = Project {
            id,
            name: draft.name,
            description: draft.description,
            created_by: draft.created_by,
            members: draft.members,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn get_by_id(&self, id: ProjectId) -> DomainResult<Option<Project>> {
        Ok(self.state.lock().projects.get(&id).cloned())
    }

    async fn list_for_member(&self, user_id: UserId) -> DomainResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .state
            .lock()
            .projects
            .values()
            .filter(|project| project.is_member(user_id))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn update(
        &self,
        project: &Project,
        members: Option<&BTreeSet<UserId>>,
    ) -> DomainResult<Project> {
        let mut state = self.state.lock();
        let (_, now) = state.next();
        let stored = state
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| ProjectFlowError::NotFound(format!("Project {}", project.id)))?;
        stored.name = project.name.clone();
        stored.description = project.description.clone();
        stored.updated_at = now;
        if let Some(members) = members {
            stored.members = members.clone();
            stored.members.insert(stored.created_by);
        }
        Ok(stored.clone())
    }

    async fn add_member(&self, project_id: ProjectId, user_id: UserId) -> DomainResult<()> {
        if let Some(project) = self.state.lock().projects.get_mut(&project_id) {
            project.members.insert(user_id);
        }
        Ok(())
    }

    async fn remove_member(&self, project_id: ProjectId, user_id: UserId) -> DomainResult<()> {
        if let Some(project) = self.state.lock().projects.get_mut(&project_id) {
            project.members.remove(&user_id);
        }
        Ok(())
    }

    async fn delete_cascade(&self, project_id: ProjectId) -> DomainResult<u64> {
        let mut state = self.state.lock();
        let task_ids: HashSet<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.project_id == project_id)
            .map(|task| task.id)
            .collect();
        state.comments.retain(|comment| !task_ids.contains(&comment.task_id));
        state.tasks.retain(|id, _| !task_ids.contains(id));
        state.projects.remove(&project_id);
        Ok(task_ids.len() as u64)
    }

    async fn count_for_member(&self, user_id: UserId) -> DomainResult<u64> {
        Ok(self.state.lock().projects.values().filter(|p| p.is_member(user_id)).count() as u64)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn create(&self, draft: TaskDraft) -> DomainResult<Task> {
        let mut state = self.state.lock();
        let (id, now) = state.next();
        let task = Task {
            id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            project_id: draft.project_id,
            assignee_id: draft.assignee_id,
            created_by: draft.created_by,
            due_date: draft.due_date,
            calendar_event_id: None,
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, id: TaskId) -> DomainResult<Option<Task>> {
        Ok(self.state.lock().tasks.get(&id).cloned())
    }

    async fn list_visible_to(&self, user_id: UserId) -> DomainResult<Vec<Task>> {
        let state = self.state.lock();
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| {
                state.projects.get(&task.project_id).is_some_and(|p| p.is_member(user_id))
            })
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn list_by_project(&self, project_id: ProjectId) -> DomainResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .state
            .lock()
            .tasks
            .values()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update(&self, task: &Task) -> DomainResult<Task> {
        let mut state = self.state.lock();
        let (_, now) = state.next();
        let stored = state
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| ProjectFlowError::NotFound(format!("Task {}", task.id)))?;
        *stored = Task { updated_at: now, ..task.clone() };
        Ok(stored.clone())
    }

    async fn set_calendar_event_id(&self, task_id: TaskId, event_id: &str) -> DomainResult<()> {
        if let Some(task) = self.state.lock().tasks.get_mut(&task_id) {
            task.calendar_event_id = Some(event_id.to_string());
        }
        Ok(())
    }

    async fn delete_cascade(&self, task_id: TaskId) -> DomainResult<()> {
        let mut state = self.state.lock();
        state.comments.retain(|comment| comment.task_id != task_id);
        state.tasks.remove(&task_id);
        Ok(())
    }

    async fn count_assigned(
        &self,
        user_id: UserId,
        status: Option<TaskStatus>,
    ) -> DomainResult<u64> {
        Ok(self
            .state
            .lock()
            .tasks
            .values()
            .filter(|task| task.assignee_id == Some(user_id))
            .filter(|task| status.map_or(true, |wanted| wanted == task.status))
            .count() as u64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, task_id: TaskId, author_id: UserId, text: &str) -> DomainResult<Comment> {
        let mut state = self.state.lock();
        let (id, now) = state.next();
        let comment = Comment {
            id,
            task_id,
            author_id,
            text: text.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_task(&self, task_id: TaskId) -> DomainResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .state
            .lock()
            .comments
            .iter()
            .filter(|comment| comment.task_id == task_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn count_for_task(&self, task_id: TaskId) -> DomainResult<u64> {
        Ok(self.state.lock().comments.iter().filter(|c| c.task_id == task_id).count() as u64)
    }
}

// ============================================================================
// Sessions
// ============================================================================

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn insert(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.state.lock().sessions.insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn owner(&self, session_id: &str, now: DateTime<Utc>) -> DomainResult<Option<UserId>> {
        Ok(self
            .state
            .lock()
            .sessions
            .get(session_id)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(user_id, _)| *user_id))
    }

    async fn get_value(&self, session_id: &str, key: &str) -> DomainResult<Option<String>> {
        Ok(self.session_value(session_id, key))
    }

    async fn set_value(&self, session_id: &str, key: &str, value: &str) -> DomainResult<()> {
        self.state
            .lock()
            .session_values
            .insert((session_id.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    async fn take_value(&self, session_id: &str, key: &str) -> DomainResult<Option<String>> {
        Ok(self.state.lock().session_values.remove(&(session_id.to_string(), key.to_string())))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let mut state = self.state.lock();
        let expired: Vec<String> = state
            .sessions
            .iter()
            .filter(|(_, (_, expires_at))| *expires_at <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            state.sessions.remove(id);
        }
        state.session_values.retain(|(id, _), _| !expired.contains(id));
        Ok(expired.len() as u64)
    }
}
