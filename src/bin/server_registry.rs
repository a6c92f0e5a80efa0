//! Runs the media server registry HTTP API.
//!
//! Usage:
//!
//! ```text
//! server-registry --admin-token <token> [--bind 127.0.0.1:9321] [--database-url <url>]
//! ```
//!
//! Without a database URL the registry keeps servers in memory.

use clap::Parser;
use server_registry::{app, config::Config, telemetry};
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    let _installed = telemetry::init(&config.log_filter);

    match app::run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server registry failed");
            ExitCode::FAILURE
        }
    }
}
