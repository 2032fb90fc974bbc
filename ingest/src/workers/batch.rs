//! Batch worker: processes one chunk of records on one pooled connection.

use tracing::{debug, error};

use crate::store::{StorePool, TableNames};
use crate::sync::sync_record;
use crate::types::{InputRecord, OutcomeCounts};

/// Per-chunk accounting returned by [`run_chunk`].
#[derive(Debug, Clone, Copy)]
pub struct ChunkReport {
    /// Position of the chunk in submission order.
    pub index: usize,
    /// Outcome counts for the chunk's records.
    pub counts: OutcomeCounts,
}

/// Processes one chunk of records sequentially on a single connection.
///
/// The connection is checked out once for the whole chunk and flows back to
/// the pool when the guard drops, on every exit path. Failure to acquire a
/// connection (after the pool's retry budget) fails the chunk as a whole;
/// a transaction-control failure mid-chunk abandons the remaining records,
/// since the connection can no longer be trusted. Neither affects other
/// chunks.
pub async fn run_chunk(
    pool: &StorePool,
    tables: &TableNames,
    index: usize,
    records: Vec<InputRecord>,
) -> ChunkReport {
    let mut counts = OutcomeCounts::default();

    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                chunk = index,
                records = records.len(),
                error = %err,
                "could not acquire a connection, chunk abandoned"
            );
            counts.record_chunk_failure(records.len());
            return ChunkReport { index, counts };
        }
    };

    let total = records.len();
    for (position, record) in records.iter().enumerate() {
        match sync_record(&mut *conn, tables, record).await {
            Ok(outcome) => counts.record(outcome),
            Err(err) => {
                error!(
                    chunk = index,
                    record = position,
                    error = %err,
                    "chunk aborted mid-flight"
                );
                counts.record_chunk_failure(total - position);
                break;
            }
        }
    }

    debug!(
        chunk = index,
        completed = counts.completed,
        failed = counts.total() - counts.completed,
        "chunk finished"
    );

    ChunkReport { index, counts }
}
