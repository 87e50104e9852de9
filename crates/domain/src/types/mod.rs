//! Domain types and models
//!
//! Entities mirror the persisted rows; the `*Details` read models carry the
//! derived values (`is_overdue`, `progress_percentage`, counts) that are
//! recomputed on every read and never stored.

pub mod analytics;
pub mod calendar;
pub mod comment;
pub mod project;
pub mod task;
pub mod user;

pub use analytics::{ChartSeries, ProjectProgress};
pub use calendar::{
    CalendarCredentials, CalendarEventDraft, CallbackOutcome, RemoteEvent, SyncAction,
    SyncOutcome, TokenGrant,
};
pub use comment::{Comment, CommentDetails};
pub use project::{
    progress_percentage, KanbanBoard, KanbanColumn, MemberRef, NewProject, Project,
    ProjectDetails, ProjectUpdate,
};
pub use task::{NewTask, Task, TaskDetails, TaskPriority, TaskStatus, TaskUpdate};
pub use user::{
    CurrentUser, NewUser, Profile, ProfileSummary, User, UserStatistics, UserSummary,
};

/// Primary key of a user row.
pub type UserId = i64;
/// Primary key of a project row.
pub type ProjectId = i64;
/// Primary key of a task row.
pub type TaskId = i64;
/// Primary key of a comment row.
pub type CommentId = i64;
