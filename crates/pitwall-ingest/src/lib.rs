//! Pitwall Ingest Library
//!
//! Season ingestion pipeline for the pitwall telemetry store: populates the
//! database from the upstream telemetry archive, one (season, round,
//! session-kind) unit at a time.
//!
//! The pipeline is idempotent — completeness is tracked per session for five
//! independent data categories (results, laps, weather, track status, race
//! control messages), already-present categories are never re-ingested, and
//! a fully-ingested session costs zero upstream calls. Failed units land in
//! a durable per-season failure log for later reconciliation.
//!
//! # Example
//!
//! ```no_run
//! use pitwall_common::SessionKind;
//! use pitwall_ingest::{config::IngestConfig, provider::ProviderClient, season, store};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::load()?;
//!     let pool = store::create_pool(&config.database).await?;
//!     let client = ProviderClient::new(&config.provider)?;
//!
//!     let stats = season::run_season(&config, &pool, &client, 2024, &SessionKind::all(), false).await?;
//!     println!("ingested {} units", stats.newly_ingested);
//!     Ok(())
//! }
//! ```

pub mod categories;
pub mod config;
pub mod failure_log;
pub mod fetch;
pub mod orchestrator;
pub mod provider;
pub mod season;
pub mod store;
