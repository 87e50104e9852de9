use std::time::Duration;

use projectflow_domain::{LoggingConfig, ProjectFlowError};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log the outcome of a request handler with structured fields.
///
/// # Parameters
/// * `command` - Logical handler identifier (e.g. `"tasks::update_status"`).
/// * `elapsed` - Duration the handler took.
/// * `error` - The failure, if any. Only its label is logged, never the message.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&ProjectFlowError>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            duration_ms,
            error_type = error_label(err),
            retryable = err.is_retryable(),
            "command_execution_failure"
        ),
    }
}

/// Convert a `ProjectFlowError` into a stable label suitable for logging and
/// error responses.
#[inline]
pub fn error_label(error: &ProjectFlowError) -> &'static str {
    match error {
        ProjectFlowError::Validation(_) => "validation",
        ProjectFlowError::Permission(_) => "permission",
        ProjectFlowError::NotFound(_) => "not_found",
        ProjectFlowError::InvalidOperation(_) => "invalid_operation",
        ProjectFlowError::Authentication(_) => "authentication",
        ProjectFlowError::ExternalService(_) => "external_service",
        ProjectFlowError::Database(_) => "database",
        ProjectFlowError::Config(_) => "config",
        ProjectFlowError::Internal(_) => "internal",
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is harmless;
/// the second subscriber is ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if let Err(err) = result {
        warn!(error = %err, "tracing subscriber already installed");
    }
}
