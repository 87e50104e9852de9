//! Modular common utilities shared across ProjectFlow crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: input validation
//! - `platform`: SQLite pooling and OAuth state/session nonces
//! - `observability`: tracing in pool setup

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod validation;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;
#[cfg(feature = "platform")]
pub mod storage;

#[cfg(feature = "foundation")]
pub use validation::{
    EmailValidator, FieldError, FieldValidator, StringValidator, ValidationError,
    ValidationResult,
};
