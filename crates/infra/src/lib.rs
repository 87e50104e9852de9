//! # ProjectFlow Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories for users, projects, tasks, comments and sessions
//! - Google OAuth2 and Calendar API adapters
//! - JWT issuance and argon2 password hashing
//! - Configuration loading from the environment or files
//!
//! ## Architecture
//! - Implements traits defined in `projectflow-core`
//! - Contains all "impure" code (I/O, HTTP, clocks)

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;

// Re-export commonly used items
pub use auth::{Argon2PasswordHasher, JwtTokenIssuer};
pub use database::*;
pub use errors::InfraError;
pub use integrations::calendar::{GoogleCalendarClient, GoogleCalendarOAuth};
