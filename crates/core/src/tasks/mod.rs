//! Tasks: visibility through project membership, unconstrained status and
//! priority transitions, list filtering.

pub mod ports;
pub mod query;
pub mod service;

pub use query::{TaskOrdering, TaskQuery};
pub use service::TaskService;
