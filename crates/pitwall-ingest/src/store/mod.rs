//! Storage access
//!
//! Point lookups and entity creation against the relational store. All
//! queries are runtime-bound; uniqueness constraints in the schema are the
//! correctness backstop for the natural keys used here.

pub mod circuits;
pub mod inventory;
pub mod participants;
pub mod sessions;

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Create the connection pool for one ingestion run
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .context("Failed to connect to database")
}
