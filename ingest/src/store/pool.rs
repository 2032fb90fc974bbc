use std::time::Duration;

use config::shared::{PgConnectionConfig, PoolConfig, RetryConfig};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};

/// Bounded pool of reusable Postgres connections.
///
/// Workers check one connection out per chunk and get it back into the pool
/// when the connection guard drops, on every exit path. Connections are
/// validated before reuse, so a dead connection is replaced rather than
/// handed out again.
#[derive(Debug, Clone)]
pub struct StorePool {
    pool: PgPool,
    retry: RetryConfig,
}

impl StorePool {
    /// Establishes the connection pool and validates it with one round-trip.
    ///
    /// Returns [`SyncError::PoolConnect`] on failure; callers treat that as
    /// fatal at startup (bad credentials, unreachable host, missing
    /// database), distinct from per-operation failures later on.
    pub async fn connect(
        connection: &PgConnectionConfig,
        pool_config: &PoolConfig,
        retry: RetryConfig,
    ) -> SyncResult<Self> {
        let options = connection.with_db().options([(
            "statement_timeout",
            pool_config.statement_timeout_ms.to_string(),
        )]);

        let pool = PgPoolOptions::new()
            .max_connections(pool_config.max_size)
            .acquire_timeout(pool_config.acquire_timeout())
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(SyncError::PoolConnect)?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(SyncError::PoolConnect)?;

        info!(
            host = %connection.host,
            database = %connection.name,
            max_connections = pool_config.max_size,
            "connection pool established"
        );

        Ok(Self { pool, retry })
    }

    /// Checks a connection out of the pool, retrying transient failures.
    ///
    /// Each attempt waits at most the configured acquire timeout; a timeout
    /// surfaces as [`SyncError::PoolExhausted`]. Retries back off
    /// exponentially up to the configured attempt budget, after which the
    /// caller is expected to fail its chunk.
    pub async fn acquire(&self) -> SyncResult<PoolConnection<Postgres>> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.pool.acquire().await {
                Ok(connection) => return Ok(connection),
                Err(err) => {
                    let err = SyncError::from_acquire(err);
                    if attempt >= self.retry.max_attempts {
                        return Err(err);
                    }

                    let delay = backoff_delay(attempt, &self.retry);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "connection acquisition failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Returns the underlying pool, for callers that issue standalone
    /// statements outside the chunk workflow.
    pub fn inner(&self) -> &PgPool {
        &self.pool
    }
}

/// Delay before the retry following the given (1-based) failed attempt.
///
/// Doubles per attempt, capped at the configured maximum.
fn backoff_delay(attempt: u32, retry: &RetryConfig) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let delay = retry
        .initial_delay()
        .saturating_mul(2_u32.saturating_pow(exponent));
    delay.min(retry.max_delay())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry(initial_ms: u64, max_ms: u64) -> RetryConfig {
        RetryConfig {
            max_attempts: 5,
            initial_delay_ms: initial_ms,
            max_delay_ms: max_ms,
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let retry = retry(500, 60_000);

        assert_eq!(backoff_delay(1, &retry), Duration::from_millis(500));
        assert_eq!(backoff_delay(2, &retry), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(3, &retry), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(4, &retry), Duration::from_millis(4_000));
    }

    #[test]
    fn backoff_respects_the_configured_cap() {
        let retry = retry(500, 1_500);

        assert_eq!(backoff_delay(3, &retry), Duration::from_millis(1_500));
        assert_eq!(backoff_delay(10, &retry), Duration::from_millis(1_500));
    }
}
