//! # ProjectFlow Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for persistence, tokens and the
//!   calendar provider
//! - Services enforcing membership, creator and OAuth handoff rules
//!
//! ## Architecture Principles
//! - Only depends on `projectflow-common` and `projectflow-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod accounts;
pub mod analytics;
pub mod calendar;
pub mod comments;
pub mod projects;
pub mod sessions;
pub mod tasks;

mod access;
mod details;

// Re-export specific items to avoid ambiguity
pub use accounts::ports::{
    PasswordHasher, ProfileRepository, RevokedTokenRepository, TokenIssuer, UserRepository,
};
pub use accounts::{AccessToken, AccountService, AuthSession, LoginRequest, RegisterRequest};
pub use accounts::{TokenClaims, TokenKind, TokenPair};
pub use analytics::AnalyticsService;
pub use calendar::ports::{CalendarAuthProvider, CalendarEventGateway};
pub use calendar::{CalendarAuthService, CalendarSyncService, CallbackParams, SyncSettings};
pub use comments::ports::CommentRepository;
pub use comments::CommentService;
pub use projects::ports::{ProjectDraft, ProjectRepository};
pub use projects::ProjectService;
pub use sessions::ports::SessionStore;
pub use sessions::{SessionContext, SessionService};
pub use tasks::ports::{TaskDraft, TaskRepository};
pub use tasks::{TaskOrdering, TaskQuery, TaskService};
