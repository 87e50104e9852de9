//! Comments: append-only children of a task

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{User, UserSummary};
use super::{CommentId, TaskId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDetails {
    pub id: CommentId,
    pub task: TaskId,
    pub author: UserSummary,
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentDetails {
    pub fn new(comment: &Comment, author: &User) -> Self {
        Self {
            id: comment.id,
            task: comment.task_id,
            author: author.summary(),
            author_name: author.display_name(),
            text: comment.text.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
