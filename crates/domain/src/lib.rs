//! # ProjectFlow Domain
//!
//! Business domain types and models for ProjectFlow.
//!
//! This crate contains:
//! - Entities (User, Profile, Project, Task, Comment) and their enums
//! - Read models returned to API clients
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other ProjectFlow crates
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
