use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Connection pool size cannot be zero.
    #[error("`pool.max_size` cannot be zero")]
    PoolSizeZero,
    /// Chunk size cannot be zero.
    #[error("`pipeline.chunk_size` cannot be zero")]
    ChunkSizeZero,
    /// Worker count cannot be zero.
    #[error("`pipeline.max_workers` cannot be zero")]
    MaxWorkersZero,
    /// Acquisition retry budget cannot be zero.
    #[error("`pipeline.acquire_retry.max_attempts` cannot be zero")]
    RetryAttemptsZero,
    /// The spreadsheet path cannot be empty.
    #[error("`spreadsheet.path` cannot be empty")]
    EmptySpreadsheetPath,
    /// A table name cannot be empty.
    #[error("table name for `{0}` cannot be empty")]
    EmptyTableName(&'static str),
    /// TLS is enabled but no trusted root certificates are provided.
    #[error("invalid TLS config: `trusted_root_certs` must be set when `enabled` is true")]
    MissingTrustedRootCerts,
}
