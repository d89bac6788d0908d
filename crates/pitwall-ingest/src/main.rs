//! Pitwall Ingest - Season ingestion tool

use anyhow::{Context, Result};
use clap::Parser;
use pitwall_common::logging::{init_logging, LogConfig, LogLevel};
use pitwall_common::SessionKind;
use pitwall_ingest::config::IngestConfig;
use pitwall_ingest::provider::ProviderClient;
use pitwall_ingest::{season, store};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pitwall-ingest")]
#[command(author, version, about = "Pitwall season ingestion tool")]
struct Cli {
    /// Season year to ingest (e.g. 2024)
    year: i32,

    /// Comma-separated session kinds to ingest
    /// (default: race,qualifying,sprint_race,sprint_qualifying)
    #[arg(short, long)]
    sessions: Option<String>,

    /// Abort on the first category ingestion failure instead of isolating it
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// The pipeline is strictly sequential, so a single-threaded runtime is all
/// the run needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment configuration first, verbose flag on top
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    let kinds = match cli.sessions.as_deref() {
        Some(list) => parse_session_kinds(list)?,
        None => SessionKind::all().to_vec(),
    };

    let config = IngestConfig::load()?;
    let pool = store::create_pool(&config.database).await?;
    let client = ProviderClient::new(&config.provider).context("Failed to build provider client")?;

    let stats = season::run_season(&config, &pool, &client, cli.year, &kinds, cli.strict).await?;

    info!(
        units = stats.units_processed(),
        newly_ingested = stats.newly_ingested,
        already_complete = stats.already_complete,
        not_available = stats.not_available,
        failed = stats.failed,
        "Ingestion complete"
    );

    Ok(())
}

/// Parse the --sessions list, rejecting unknown kinds up front
fn parse_session_kinds(list: &str) -> Result<Vec<SessionKind>> {
    let mut kinds = Vec::new();

    for part in list.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let kind: SessionKind = part
            .parse()
            .with_context(|| format!("Invalid session kind '{}'", part))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    if kinds.is_empty() {
        anyhow::bail!("No session kinds given");
    }

    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_kinds_list() {
        let kinds = parse_session_kinds("race, qualifying").unwrap();
        assert_eq!(kinds, vec![SessionKind::Race, SessionKind::Qualifying]);
    }

    #[test]
    fn test_parse_session_kinds_dedupes() {
        let kinds = parse_session_kinds("race,race").unwrap();
        assert_eq!(kinds, vec![SessionKind::Race]);
    }

    #[test]
    fn test_parse_session_kinds_rejects_unknown() {
        assert!(parse_session_kinds("race,practice").is_err());
        assert!(parse_session_kinds("").is_err());
    }
}
