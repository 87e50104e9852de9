//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the process environment when present
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `PROJECTFLOW_DB_PATH`: Database file path
//! - `PROJECTFLOW_JWT_SECRET`: HMAC secret for access/refresh tokens
//!
//! Optional (defaults from [`Config::default`]):
//! - `PROJECTFLOW_HOST`, `PROJECTFLOW_PORT`
//! - `PROJECTFLOW_DB_POOL_SIZE`, `PROJECTFLOW_DB_BUSY_TIMEOUT_MS`
//! - `PROJECTFLOW_ACCESS_TOKEN_TTL`, `PROJECTFLOW_REFRESH_TOKEN_TTL`,
//!   `PROJECTFLOW_SESSION_TTL` (seconds)
//! - `PROJECTFLOW_GOOGLE_CLIENT_ID`, `PROJECTFLOW_GOOGLE_CLIENT_SECRET`,
//!   `PROJECTFLOW_GOOGLE_REDIRECT_URI`
//! - `PROJECTFLOW_CALENDAR_TIME_ZONE`
//! - `PROJECTFLOW_LOG_LEVEL`, `PROJECTFLOW_LOG_JSON`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `$PROJECTFLOW_CONFIG`
//! 2. `./projectflow.toml`
//! 3. `./config/projectflow.toml`
//! 4. `./projectflow.json`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use projectflow_domain::{Config, ProjectFlowError, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file. The
/// result is validated before it is returned.
///
/// # Errors
/// Returns `ProjectFlowError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation fails (e.g. empty JWT secret)
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ProjectFlowError::Config` if required variables are missing
/// or optional ones have invalid values.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("PROJECTFLOW_DB_PATH")?;
    config.auth.jwt_secret = env_var("PROJECTFLOW_JWT_SECRET")?;

    if let Some(host) = env_opt("PROJECTFLOW_HOST") {
        config.server.host = host;
    }
    if let Some(port) = env_parse("PROJECTFLOW_PORT")? {
        config.server.port = port;
    }
    if let Some(pool_size) = env_parse("PROJECTFLOW_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }
    if let Some(busy_timeout) = env_parse("PROJECTFLOW_DB_BUSY_TIMEOUT_MS")? {
        config.database.busy_timeout_ms = busy_timeout;
    }
    if let Some(ttl) = env_parse("PROJECTFLOW_ACCESS_TOKEN_TTL")? {
        config.auth.access_token_ttl_secs = ttl;
    }
    if let Some(ttl) = env_parse("PROJECTFLOW_REFRESH_TOKEN_TTL")? {
        config.auth.refresh_token_ttl_secs = ttl;
    }
    if let Some(ttl) = env_parse("PROJECTFLOW_SESSION_TTL")? {
        config.auth.session_ttl_secs = ttl;
    }

    if let Some(client_id) = env_opt("PROJECTFLOW_GOOGLE_CLIENT_ID") {
        config.calendar.client_id = client_id;
    }
    if let Some(client_secret) = env_opt("PROJECTFLOW_GOOGLE_CLIENT_SECRET") {
        config.calendar.client_secret = client_secret;
    }
    if let Some(redirect_uri) = env_opt("PROJECTFLOW_GOOGLE_REDIRECT_URI") {
        config.calendar.redirect_uri = redirect_uri;
    }
    if let Some(time_zone) = env_opt("PROJECTFLOW_CALENDAR_TIME_ZONE") {
        config.calendar.time_zone = time_zone;
    }

    if let Some(level) = env_opt("PROJECTFLOW_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("PROJECTFLOW_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ProjectFlowError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ProjectFlowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ProjectFlowError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ProjectFlowError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ProjectFlowError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ProjectFlowError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ProjectFlowError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(explicit) = env_opt("PROJECTFLOW_CONFIG") {
        candidates.push(PathBuf::from(explicit));
    }

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend([
            cwd.join("projectflow.toml"),
            cwd.join("config").join("projectflow.toml"),
            cwd.join("projectflow.json"),
        ]);
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        ProjectFlowError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Non-empty environment variable, if set.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ProjectFlowError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
