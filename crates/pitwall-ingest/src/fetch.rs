//! Retrying session fetcher
//!
//! Wraps the provider client with classified-error retry: a session that does
//! not exist upstream returns immediately (sprint kinds at non-sprint events
//! are routine, and retrying them burns request quota for the whole run),
//! while transient failures back off exponentially up to a configured number
//! of attempts. The control flow is an explicit attempt loop so the retry
//! budget is visible in one place.

use anyhow::Context;
use tokio::time::sleep;
use tracing::{debug, warn};

use pitwall_common::SessionKind;

use crate::config::RetryConfig;
use crate::provider::models::SessionBundle;
use crate::provider::{ProviderClient, ProviderError};

/// Result of one session fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// Session loaded, ready for dispatch
    Loaded(Box<SessionBundle>),
    /// The provider reports no such session; expected, not retried
    NotAvailable,
}

/// Session fetcher with retry
pub struct SessionFetcher<'a> {
    client: &'a ProviderClient,
    retry: RetryConfig,
}

impl<'a> SessionFetcher<'a> {
    pub fn new(client: &'a ProviderClient, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// Fetch one session, retrying transient failures
    ///
    /// The final attempt's error propagates as a hard error for the unit.
    pub async fn fetch(
        &self,
        year: i32,
        round: i32,
        kind: SessionKind,
    ) -> anyhow::Result<FetchOutcome> {
        let mut attempt = 1u32;

        loop {
            match self.client.load_session(year, round, kind).await {
                Ok(bundle) => {
                    debug!(year, round, kind = %kind, attempt, "Session loaded");
                    return Ok(FetchOutcome::Loaded(Box::new(bundle)));
                }
                Err(err) if is_nonexistent(&err) => {
                    debug!(year, round, kind = %kind, "Session does not exist upstream");
                    return Ok(FetchOutcome::NotAvailable);
                }
                Err(err) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        year,
                        round,
                        kind = %kind,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient fetch failure, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!(
                            "fetch of {} {} round {} failed after {} attempts",
                            year, kind, round, attempt
                        )
                    });
                }
            }
        }
    }
}

/// Classify a provider error as genuine upstream non-existence.
///
/// The typed NotFound variant covers the provider's 404s; the message probe
/// covers feeds that tunnel the condition through a generic error string.
/// Everything else is treated as transient.
fn is_nonexistent(err: &ProviderError) -> bool {
    if matches!(err, ProviderError::NotFound(_)) {
        return true;
    }

    let message = err.to_string().to_lowercase();
    message.contains("does not exist") || message.contains("no such session")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variant_is_nonexistent() {
        let err = ProviderError::NotFound("session does not exist upstream".into());
        assert!(is_nonexistent(&err));
    }

    #[test]
    fn test_message_content_classification() {
        let err = ProviderError::Status {
            status: 500,
            body: "upstream feed: No such session for round 3".into(),
        };
        assert!(is_nonexistent(&err));

        let err = ProviderError::Status {
            status: 429,
            body: "rate limited, slow down".into(),
        };
        assert!(!is_nonexistent(&err));
    }

    #[test]
    fn test_decode_errors_are_transient() {
        let err = ProviderError::Decode(serde_json::from_str::<i32>("x").unwrap_err());
        assert!(!is_nonexistent(&err));
    }
}
