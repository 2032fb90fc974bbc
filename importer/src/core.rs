use config::shared::ImporterConfig;
use ingest::pipeline::Pipeline;
use ingest::source::SpreadsheetSource;
use ingest::store::{StorePool, TableNames};
use ingest::types::RunSummary;
use tracing::info;

use crate::error::ImporterResult;

/// Runs one full import: read the spreadsheet, establish the pool, fan the
/// records out to the chunk workers and wait for the summary.
///
/// Source and pool failures here are fatal; per-record and per-chunk
/// failures are best-effort and only show up in the returned summary.
pub async fn run_import(config: ImporterConfig) -> ImporterResult<RunSummary> {
    let source = SpreadsheetSource::new(&config.spreadsheet.path, config.spreadsheet.sheet.clone());
    let records = source.read()?;
    info!(
        records = records.len(),
        path = %config.spreadsheet.path,
        "loaded input records"
    );

    let pool = StorePool::connect(
        &config.destination,
        &config.pipeline.pool,
        config.pipeline.acquire_retry.clone(),
    )
    .await?;

    let tables = TableNames::new(&config.tables);
    let pipeline = Pipeline::new(pool, tables, &config.pipeline);

    Ok(pipeline.run(records).await)
}
