//! REST handlers, one module per resource

pub mod analytics;
pub mod auth;
pub mod calendar;
pub mod health;
pub mod projects;
pub mod tasks;
