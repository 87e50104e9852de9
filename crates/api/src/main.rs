//! ProjectFlow - project and task tracking REST server
//!
//! Main entry point.

use std::process::ExitCode;

use projectflow_lib::utils::logging::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match projectflow_infra::config::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(&projectflow_domain::LoggingConfig::default());
            tracing::error!(error = %err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    tracing::info!("ProjectFlow starting...");
    match projectflow_lib::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server stopped with an error");
            ExitCode::FAILURE
        }
    }
}
