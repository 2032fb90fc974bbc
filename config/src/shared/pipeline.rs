use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Connection pool sizing and acquisition limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PoolConfig {
    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub max_size: u32,
    /// Maximum time, in milliseconds, to wait for a pooled connection before
    /// the acquisition is reported as exhausted.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    /// Server-side `statement_timeout` applied to every pooled connection,
    /// in milliseconds, so a stuck statement cannot starve the pool.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
}

impl PoolConfig {
    /// Default maximum pool size.
    pub const DEFAULT_MAX_SIZE: u32 = 5;

    /// Default acquisition timeout in milliseconds.
    pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 30_000;

    /// Default per-statement timeout in milliseconds.
    pub const DEFAULT_STATEMENT_TIMEOUT_MS: u64 = 30_000;

    /// Returns the acquisition timeout as a [`Duration`].
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: default_pool_max_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            statement_timeout_ms: default_statement_timeout_ms(),
        }
    }
}

fn default_pool_max_size() -> u32 {
    PoolConfig::DEFAULT_MAX_SIZE
}

fn default_acquire_timeout_ms() -> u64 {
    PoolConfig::DEFAULT_ACQUIRE_TIMEOUT_MS
}

fn default_statement_timeout_ms() -> u64 {
    PoolConfig::DEFAULT_STATEMENT_TIMEOUT_MS
}

/// Bounded retry policy for transient connection acquisition failures.
///
/// After each failed attempt the delay doubles until it reaches
/// [`RetryConfig::max_delay_ms`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of acquisition attempts before the chunk is failed.
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_retry_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound on the delay between retries, in milliseconds.
    #[serde(default = "default_retry_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetryConfig {
    /// Default number of acquisition attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Default initial retry delay in milliseconds.
    pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;

    /// Default maximum retry delay in milliseconds.
    pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;

    /// Returns the initial retry delay as a [`Duration`].
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Returns the maximum retry delay as a [`Duration`].
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            initial_delay_ms: default_retry_initial_delay_ms(),
            max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

fn default_retry_max_attempts() -> u32 {
    RetryConfig::DEFAULT_MAX_ATTEMPTS
}

fn default_retry_initial_delay_ms() -> u64 {
    RetryConfig::DEFAULT_INITIAL_DELAY_MS
}

fn default_retry_max_delay_ms() -> u64 {
    RetryConfig::DEFAULT_MAX_DELAY_MS
}

/// Configuration for the synchronization pipeline.
///
/// Contains all settings that shape how the input is partitioned and how
/// many workers drive chunks against the connection pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Connection pool sizing and acquisition limits.
    #[serde(default)]
    pub pool: PoolConfig,
    /// Number of records assigned to one worker at a time.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Maximum number of chunks processed concurrently.
    #[serde(default = "default_max_workers")]
    pub max_workers: u16,
    /// Retry policy for transient connection acquisition failures.
    #[serde(default)]
    pub acquire_retry: RetryConfig,
}

impl PipelineConfig {
    /// Default chunk size.
    pub const DEFAULT_CHUNK_SIZE: usize = 10;

    /// Default worker count.
    pub const DEFAULT_MAX_WORKERS: u16 = 4;

    /// Validates pipeline configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pool.max_size == 0 {
            return Err(ValidationError::PoolSizeZero);
        }

        if self.chunk_size == 0 {
            return Err(ValidationError::ChunkSizeZero);
        }

        if self.max_workers == 0 {
            return Err(ValidationError::MaxWorkersZero);
        }

        if self.acquire_retry.max_attempts == 0 {
            return Err(ValidationError::RetryAttemptsZero);
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            chunk_size: default_chunk_size(),
            max_workers: default_max_workers(),
            acquire_retry: RetryConfig::default(),
        }
    }
}

fn default_chunk_size() -> usize {
    PipelineConfig::DEFAULT_CHUNK_SIZE
}

fn default_max_workers() -> u16 {
    PipelineConfig::DEFAULT_MAX_WORKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut config = PipelineConfig::default();
        config.pool.max_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::PoolSizeZero)
        ));

        let mut config = PipelineConfig::default();
        config.chunk_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ChunkSizeZero)
        ));

        let mut config = PipelineConfig::default();
        config.max_workers = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MaxWorkersZero)
        ));

        let mut config = PipelineConfig::default();
        config.acquire_retry.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::RetryAttemptsZero)
        ));
    }
}
