//! Database implementations

pub(crate) mod codec;
pub mod comment_repository;
pub mod manager;
pub mod project_repository;
pub mod session_repository;
pub mod task_repository;
pub mod user_repository;

pub use comment_repository::*;
pub use manager::*;
pub use project_repository::*;
pub use session_repository::*;
pub use task_repository::*;
pub use user_repository::*;
