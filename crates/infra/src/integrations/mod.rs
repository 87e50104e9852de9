//! Third-party service integrations

pub mod calendar;
