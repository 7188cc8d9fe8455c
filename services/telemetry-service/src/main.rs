mod access_log;
mod app;
mod config;
mod handlers;
mod models;
mod server;
#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use asteria_common::{init_tracing, shutdown_signal};

use crate::config::ServiceConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let _guards = init_tracing("telemetry-service");

    let config = ServiceConfig::from_env();
    let handle = match server::start(config.port).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(error = %err, "telemetry service failed to start");
            return ExitCode::FAILURE;
        }
    };

    shutdown_signal().await;

    match handle.stop().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "telemetry service exited with error");
            ExitCode::FAILURE
        }
    }
}
