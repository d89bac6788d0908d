//! Upstream telemetry provider client
//!
//! One explicitly constructed client per run: a reqwest HTTP client plus an
//! on-disk response cache keyed by (year, round, session kind). Session
//! payloads are large and immutable once published, so a cache hit skips the
//! network entirely; schedules are small and always fetched fresh.

pub mod models;
pub mod time;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use pitwall_common::SessionKind;

use crate::config::ProviderConfig;
use models::{RawScheduleEvent, SessionBundle};

/// Errors raised by the provider client
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The requested session does not exist upstream. An expected outcome
    /// for sprint kinds at non-sprint events; never retried.
    #[error("session does not exist upstream: {0}")]
    NotFound(String),

    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cache IO error: {0}")]
    Cache(#[from] std::io::Error),
}

/// HTTP client for the upstream telemetry archive
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    cache_dir: PathBuf,
}

impl ProviderClient {
    /// Create a client from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache_dir: config.cache_dir.clone(),
        })
    }

    /// Fetch a season's schedule: one entry per round, testing included
    pub async fn schedule(&self, year: i32) -> Result<Vec<RawScheduleEvent>, ProviderError> {
        let url = format!("{}/season/{}/schedule", self.base_url, year);
        debug!(url = %url, "Fetching season schedule");

        let body = self.get_text(&url).await?;
        let events: Vec<RawScheduleEvent> = serde_json::from_str(&body)?;

        Ok(events)
    }

    /// Load one session's full dataset, consulting the disk cache first
    pub async fn load_session(
        &self,
        year: i32,
        round: i32,
        kind: SessionKind,
    ) -> Result<SessionBundle, ProviderError> {
        let cache_path = self.cache_path(year, round, kind);

        if let Some(bundle) = self.read_cache(&cache_path) {
            debug!(
                year,
                round,
                kind = %kind,
                path = %cache_path.display(),
                "Session loaded from cache"
            );
            return Ok(bundle);
        }

        let url = format!(
            "{}/season/{}/round/{}/session/{}",
            self.base_url,
            year,
            round,
            kind.as_str()
        );
        debug!(url = %url, "Loading session from provider");

        let body = self.get_text(&url).await?;
        let bundle: SessionBundle = serde_json::from_str(&body)?;

        self.write_cache(&cache_path, &body);

        Ok(bundle)
    }

    /// Issue a GET and map non-success statuses into provider errors
    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if status.as_u16() == 404 || body.contains("does not exist") {
                let detail = if body.is_empty() {
                    format!("{} (status 404)", url)
                } else {
                    body
                };
                return Err(ProviderError::NotFound(detail));
            }

            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn cache_path(&self, year: i32, round: i32, kind: SessionKind) -> PathBuf {
        self.cache_dir
            .join(year.to_string())
            .join(format!("r{:02}_{}.json", round, kind.as_str()))
    }

    /// Read a cached payload; any miss or decode failure falls back to the network
    fn read_cache(&self, path: &Path) -> Option<SessionBundle> {
        let body = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&body) {
            Ok(bundle) => Some(bundle),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Discarding undecodable cache entry"
                );
                None
            }
        }
    }

    /// Best-effort cache write; a full disk must not fail the ingestion
    fn write_cache(&self, path: &Path, body: &str) {
        let result = path
            .parent()
            .map(fs::create_dir_all)
            .unwrap_or(Ok(()))
            .and_then(|_| fs::write(path, body));

        if let Err(err) = result {
            warn!(
                path = %path.display(),
                error = %err,
                "Failed to write provider cache entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(cache_dir: PathBuf) -> ProviderClient {
        ProviderClient::new(&ProviderConfig {
            base_url: "http://localhost:9/v1/".to_string(),
            cache_dir,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = test_client(PathBuf::from("/tmp/pitwall-cache"));
        assert_eq!(client.base_url, "http://localhost:9/v1");
    }

    #[test]
    fn test_cache_path_layout() {
        let client = test_client(PathBuf::from("/var/cache/pitwall"));
        let path = client.cache_path(2024, 4, SessionKind::SprintRace);
        assert_eq!(
            path,
            PathBuf::from("/var/cache/pitwall/2024/r04_sprint_race.json")
        );
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path().to_path_buf());

        let path = client.cache_path(2024, 1, SessionKind::Race);
        client.write_cache(&path, r#"{"results": [{"driver_code": "VER"}]}"#);

        let bundle = client.read_cache(&path).expect("cache entry readable");
        assert_eq!(bundle.results.len(), 1);
    }

    #[test]
    fn test_corrupt_cache_entry_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path().to_path_buf());

        let path = client.cache_path(2024, 1, SessionKind::Race);
        client.write_cache(&path, "not json at all");

        assert!(client.read_cache(&path).is_none());
    }
}
