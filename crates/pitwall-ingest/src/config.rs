//! Ingestion configuration
//!
//! Everything the pipeline needs for one run: database pool settings, the
//! upstream provider endpoint and cache location, retry tuning for session
//! fetches, and the failure-log directory. Loaded once from the environment
//! at startup and passed down explicitly.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/pitwall";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default base URL of the upstream telemetry provider.
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://telemetry-archive.pitwall.dev/v1";

/// Default directory for the provider's on-disk response cache.
pub const DEFAULT_PROVIDER_CACHE_DIR: &str = "./cache";

/// Default HTTP timeout for provider requests in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

/// Default maximum number of attempts for one session fetch.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// Default base delay between fetch attempts in milliseconds.
/// The n-th retry waits `base * 2^(n-1)`, so 1s, 2s, 4s with the default.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;

/// Default directory for per-season failure logs.
pub const DEFAULT_FAILURE_LOG_DIR: &str = "./data";

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub retry: RetryConfig,
    /// Directory where per-season failure logs are written
    pub failure_log_dir: PathBuf,
}

/// Database pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Upstream telemetry provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API
    pub base_url: String,
    /// Directory for the on-disk response cache, keyed (year, round, kind)
    pub cache_dir: PathBuf,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Retry tuning for session fetches
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts for one fetch (first try included)
    pub max_attempts: u32,
    /// Base delay before the first retry; doubles on each further retry
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

impl RetryConfig {
    /// Backoff delay after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl IngestConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = IngestConfig {
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            },
            provider: ProviderConfig {
                base_url: std::env::var("PITWALL_PROVIDER_URL")
                    .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string()),
                cache_dir: std::env::var("PITWALL_CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROVIDER_CACHE_DIR)),
                timeout_secs: std::env::var("PITWALL_PROVIDER_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
            },
            retry: RetryConfig {
                max_attempts: std::env::var("PITWALL_RETRY_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS),
                base_delay_ms: std::env::var("PITWALL_RETRY_BASE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
            },
            failure_log_dir: std::env::var("PITWALL_FAILURE_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_FAILURE_LOG_DIR)),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.provider.base_url.is_empty() {
            anyhow::bail!("Provider base URL cannot be empty");
        }

        if self.retry.max_attempts == 0 {
            anyhow::bail!("Retry max_attempts must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_schedule() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for(1), Duration::from_secs(1));
        assert_eq!(retry.delay_for(2), Duration::from_secs(2));
        assert_eq!(retry.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_respects_base_delay() {
        let retry = RetryConfig {
            max_attempts: 5,
            base_delay_ms: 50,
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(50));
        assert_eq!(retry.delay_for(3), Duration::from_millis(200));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = IngestConfig {
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            },
            provider: ProviderConfig {
                base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
                cache_dir: PathBuf::from(DEFAULT_PROVIDER_CACHE_DIR),
                timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            },
            retry: RetryConfig::default(),
            failure_log_dir: PathBuf::from(DEFAULT_FAILURE_LOG_DIR),
        };
        assert!(config.validate().is_ok());

        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
