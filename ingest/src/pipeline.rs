//! Pipeline coordinator: partitions the input and fans chunks out to a
//! bounded set of concurrent workers.

use std::sync::Arc;
use std::time::Instant;

use config::shared::PipelineConfig;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::store::{StorePool, TableNames};
use crate::types::{InputRecord, OutcomeCounts, RunSummary};
use crate::workers::{ChunkReport, run_chunk};

/// Coordinates a full synchronization run.
///
/// Chunks are submitted in input order; a semaphore caps how many run at
/// once, and completion order is unconstrained. Individual chunk and record
/// failures are folded into the summary rather than aborting the run.
#[derive(Debug)]
pub struct Pipeline {
    pool: StorePool,
    tables: TableNames,
    chunk_size: usize,
    max_workers: usize,
}

impl Pipeline {
    /// Creates a pipeline over an established pool.
    pub fn new(pool: StorePool, tables: TableNames, config: &PipelineConfig) -> Self {
        Self {
            pool,
            tables,
            chunk_size: config.chunk_size,
            max_workers: config.max_workers as usize,
        }
    }

    /// Runs the pipeline over the given records and waits for every chunk.
    pub async fn run(&self, records: Vec<InputRecord>) -> RunSummary {
        let started = Instant::now();

        let total = records.len();
        let chunks = partition(records, self.chunk_size);
        let chunk_count = chunks.len();

        info!(
            records = total,
            chunks = chunk_count,
            workers = self.max_workers,
            "starting synchronization run"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut workers: JoinSet<ChunkReport> = JoinSet::new();
        let mut counts = OutcomeCounts::default();

        for (index, chunk) in chunks.into_iter().enumerate() {
            // Acquire a concurrency slot and hold it until the chunk is done.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    error!(chunk = index, "worker semaphore closed, chunk abandoned");
                    counts.record_chunk_failure(chunk.len());
                    continue;
                }
            };

            let pool = self.pool.clone();
            let tables = self.tables.clone();

            workers.spawn(async move {
                let _permit = permit;

                run_chunk(&pool, &tables, index, chunk).await
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(report) => counts.merge(report.counts),
                Err(err) => error!(error = %err, "chunk worker did not complete"),
            }
        }

        let summary = RunSummary {
            counts,
            chunks: chunk_count,
            elapsed: started.elapsed(),
        };

        info!(
            completed = summary.counts.completed,
            partial_group = summary.counts.partial_group,
            partial_location = summary.counts.partial_location,
            partial_user = summary.counts.partial_user,
            chunk_failed = summary.counts.chunk_failed,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "synchronization run finished"
        );

        summary
    }
}

/// Splits records into contiguous chunks of `chunk_size`, preserving input
/// order. The last chunk may be smaller.
fn partition(records: Vec<InputRecord>, chunk_size: usize) -> Vec<Vec<InputRecord>> {
    let mut chunks = Vec::with_capacity(records.len().div_ceil(chunk_size.max(1)));
    let mut records = records.into_iter();

    loop {
        let chunk: Vec<InputRecord> = records.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }

    chunks
}
