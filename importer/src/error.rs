//! Error type for the importer binary.

use config::LoadConfigError;
use config::shared::ValidationError;
use ingest::error::SyncError;
use thiserror::Error;

/// Result type for importer operations.
pub type ImporterResult<T> = Result<T, ImporterError>;

/// Error type for the importer service.
///
/// Wraps the library error types and provides variants for infrastructure
/// failures at the binary boundary.
#[derive(Debug, Error)]
pub enum ImporterError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] LoadConfigError),

    /// Configuration was loaded but failed validation.
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// A synchronization failure that is fatal for the run.
    #[error("synchronization error: {0}")]
    Sync(#[from] SyncError),

    /// Runtime construction or other I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImporterError {
    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            ImporterError::Config(_) => "configuration error",
            ImporterError::Validation(_) => "configuration error",
            ImporterError::Sync(SyncError::PoolConnect(_)) => "startup error",
            ImporterError::Sync(SyncError::SourceRead { .. }) => "source error",
            ImporterError::Sync(_) => "synchronization error",
            ImporterError::Io(_) => "i/o error",
        }
    }

    /// Returns a diagnostic report for terminal output.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        out.push_str("importer failed\n");
        out.push_str(&format!("category: {}\n", self.category()));
        out.push_str(&format!("error: {self}\n"));

        let mut source = std::error::Error::source(self);
        let mut idx = 1usize;
        while let Some(err) = source {
            out.push_str(&format!("cause {idx}: {err}\n"));
            source = err.source();
            idx += 1;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_connect_failures_are_reported_as_startup_errors() {
        let err = ImporterError::Sync(SyncError::PoolConnect(sqlx::Error::PoolClosed));

        assert_eq!(err.category(), "startup error");

        let report = err.render_report();
        assert!(report.starts_with("importer failed\n"));
        assert!(report.contains("category: startup error"));
    }

    #[test]
    fn record_level_failures_keep_their_own_category() {
        let err = ImporterError::Sync(SyncError::PoolExhausted);

        assert_eq!(err.category(), "synchronization error");
    }
}
