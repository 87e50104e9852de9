//! Health report returned by `GET /api/health/`

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Overall health of the server
///
/// # Example
/// ```no_run
/// use projectflow_lib::utils::health::{ComponentHealth, HealthStatus};
///
/// let status = HealthStatus::from_components(vec![
///     ComponentHealth::healthy("database"),
///     ComponentHealth::unhealthy("calendar", "client id missing"),
/// ]);
/// assert!(!status.is_healthy);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// True when every component is healthy
    pub is_healthy: bool,

    pub components: Vec<ComponentHealth>,

    /// Unix timestamp (seconds) of the check
    pub timestamp: i64,
}

impl HealthStatus {
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let is_healthy = components.iter().all(|c| c.is_healthy);
        Self { is_healthy, components, timestamp: Utc::now().timestamp() }
    }

    /// Names of the failing components, for logging.
    pub fn failing(&self) -> Vec<&str> {
        self.components.iter().filter(|c| !c.is_healthy).map(|c| c.name.as_str()).collect()
    }
}

/// Health of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
