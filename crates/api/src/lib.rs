//! # ProjectFlow API
//!
//! HTTP application layer - REST handlers and the server entry point.
//!
//! This crate contains:
//! - axum handlers for accounts, projects, tasks, calendar and analytics
//! - Application context (dependency injection)
//! - Error-to-HTTP mapping and request extractors
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod error;
pub mod extract;
pub mod router;
pub mod utils;

use std::sync::Arc;

use projectflow_domain::{Config, ProjectFlowError, Result};
use tokio::net::TcpListener;
use tracing::info;

// Re-export for convenience
pub use context::AppContext;
pub use error::{ApiError, ApiResult};
pub use router::build_router;

/// Build the context and serve until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    let address = config.server.bind_address();
    let ctx = Arc::new(AppContext::new_with_config(config)?);

    let purged = ctx.sessions.purge_expired().await?;
    if purged > 0 {
        info!(purged, "expired sessions removed");
    }

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| ProjectFlowError::Config(format!("cannot bind {}: {}", address, e)))?;
    info!(%address, "ProjectFlow listening");

    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ProjectFlowError::Internal(format!("server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown requested");
}
