//! Error types and result definitions for synchronization operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::source::SourceReadError;

/// Convenient result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// The entity type an upsert operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Group,
    Location,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Group => f.write_str("group"),
            EntityKind::Location => f.write_str("location"),
            EntityKind::User => f.write_str("user"),
        }
    }
}

/// Main error type for synchronization operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The connection pool could not be established at startup.
    ///
    /// This is fatal for the whole run, unlike per-operation failures which
    /// only affect the owning chunk or record.
    #[error("failed to establish the connection pool: {0}")]
    PoolConnect(#[source] sqlx::Error),

    /// Waiting for a pooled connection exceeded the acquire timeout.
    #[error("timed out waiting for a pooled connection")]
    PoolExhausted,

    /// The database connection failed underneath an operation.
    #[error("database connection lost: {0}")]
    ConnectionLost(#[source] sqlx::Error),

    /// An entity upsert failed.
    ///
    /// Aborts the remaining stages of the one record's chain and is recorded
    /// in the chunk report rather than raised further.
    #[error("{entity} upsert failed for natural key `{natural_key}`: {source}")]
    Upsert {
        entity: EntityKind,
        natural_key: String,
        #[source]
        source: sqlx::Error,
    },

    /// Opening, committing or rolling back a per-record transaction failed.
    #[error("transaction control failed: {0}")]
    Transaction(#[source] sqlx::Error),

    /// The input spreadsheet could not be read. Fatal for the whole run.
    #[error("failed to read records from `{path}`: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: SourceReadError,
    },
}

impl SyncError {
    /// Classifies a connection acquisition failure.
    ///
    /// A pool timeout maps to [`SyncError::PoolExhausted`]; everything else
    /// is treated as a lost connection.
    pub fn from_acquire(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => SyncError::PoolExhausted,
            other => SyncError::ConnectionLost(other),
        }
    }

    /// Returns whether retrying the failed operation can help.
    ///
    /// Only acquisition-level failures are transient; upsert and source
    /// failures are not retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::PoolExhausted | SyncError::ConnectionLost(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_classified_as_exhausted() {
        let err = SyncError::from_acquire(sqlx::Error::PoolTimedOut);

        assert!(matches!(err, SyncError::PoolExhausted));
        assert!(err.is_transient());
    }

    #[test]
    fn other_acquire_failures_are_lost_connections() {
        let err = SyncError::from_acquire(sqlx::Error::WorkerCrashed);

        assert!(matches!(err, SyncError::ConnectionLost(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn upsert_failures_are_not_transient() {
        let err = SyncError::Upsert {
            entity: EntityKind::Group,
            natural_key: "finance".to_owned(),
            source: sqlx::Error::RowNotFound,
        };

        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "group upsert failed for natural key `finance`: \
             no rows returned by a query that expected to return at least one row"
        );
    }
}
