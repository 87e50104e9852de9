//! Projects: membership-gated reads, creator-gated membership edits.

pub mod ports;
pub mod service;

pub use service::ProjectService;
