//! Configuration management

use serde::{Deserialize, Serialize};

use crate::errors::{ProjectFlowError, Result};

pub const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const GOOGLE_CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(ProjectFlowError::Config("database.pool_size must be at least 1".into()));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ProjectFlowError::Config("auth.jwt_secret must be set".into()));
        }
        if self.auth.access_token_ttl_secs == 0 || self.auth.refresh_token_ttl_secs == 0 {
            return Err(ProjectFlowError::Config("token lifetimes must be positive".into()));
        }
        if self.calendar.request_timeout_secs == 0 {
            return Err(ProjectFlowError::Config(
                "calendar.request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8000 }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "projectflow.db".to_string(), pool_size: 8, busy_timeout_ms: 5000 }
    }
}

/// Account tokens and sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub session_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: 300,
            refresh_token_ttl_secs: 86_400,
            session_ttl_secs: 1_209_600,
        }
    }
}

/// Google Calendar OAuth client and event sync settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub api_base_url: String,
    pub scopes: Vec<String>,
    pub time_zone: String,
    pub event_title_prefix: String,
    pub request_timeout_secs: u64,
    /// Refresh the access token when it expires within this window
    pub refresh_threshold_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8000/api/calendar/auth-callback/".to_string(),
            authorization_endpoint: GOOGLE_AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            api_base_url: GOOGLE_CALENDAR_API_BASE.to_string(),
            scopes: vec![GOOGLE_CALENDAR_SCOPE.to_string()],
            time_zone: "UTC".to_string(),
            event_title_prefix: "[ProjectFlow]".to_string(),
            request_timeout_secs: 10,
            refresh_threshold_secs: 300,
        }
    }
}

/// Tracing output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.auth.jwt_secret = "secret".into();
        config
    }

    #[test]
    fn defaults_point_at_google() {
        let config = Config::default();
        assert_eq!(config.calendar.token_endpoint, GOOGLE_TOKEN_ENDPOINT);
        assert_eq!(config.calendar.scopes, vec![GOOGLE_CALENDAR_SCOPE.to_string()]);
        assert_eq!(config.server.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn validate_requires_jwt_secret() {
        assert!(Config::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_pool() {
        let mut config = valid();
        config.database.pool_size = 0;
        assert!(matches!(config.validate(), Err(ProjectFlowError::Config(_))));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"database": {"path": "/tmp/pf.db"}}"#).unwrap();
        assert_eq!(config.database.path, "/tmp/pf.db");
        assert_eq!(config.database.pool_size, 8);
        assert_eq!(config.auth.access_token_ttl_secs, 300);
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut config = valid();
        config.calendar.client_secret = "shh".into();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("shh"));
        assert!(!json.contains("jwt_secret"));
    }
}
