//! Pitwall API - Read API server

use anyhow::Result;
use pitwall_api::config::Config;
use pitwall_common::logging::{init_logging, LogConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::from_env()?;
    init_logging(&log_config)?;

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting Pitwall API"
    );

    pitwall_api::serve(config).await
}
