//! Row synchronizer: drives the three chained upserts for one record.

use sqlx::{Connection, PgConnection, Postgres, Transaction};
use tracing::warn;

use crate::error::{SyncError, SyncResult};
use crate::store::{TableNames, upsert_group, upsert_location, upsert_user};
use crate::types::{InputRecord, RecordOutcome};

/// Synchronizes one record into the three destination tables.
///
/// The upserts run strictly in dependency order — group, then location,
/// then user — inside one transaction, so the chain commits or rolls back
/// as a unit and no orphan foreign key is ever left behind. A failed stage
/// short-circuits the rest of the chain and yields the matching partial
/// outcome; only transaction control failures (begin/commit/rollback) are
/// raised to the caller, which treats the connection as suspect.
pub async fn sync_record(
    conn: &mut PgConnection,
    tables: &TableNames,
    record: &InputRecord,
) -> SyncResult<RecordOutcome> {
    let mut txn = conn.begin().await.map_err(SyncError::Transaction)?;

    let group_id = match upsert_group(&mut *txn, tables, record).await {
        Ok(id) => id,
        Err(err) => return abandon(txn, RecordOutcome::PartialGroup, err).await,
    };

    let location_id = match upsert_location(&mut *txn, tables, record, group_id).await {
        Ok(id) => id,
        Err(err) => return abandon(txn, RecordOutcome::PartialLocation, err).await,
    };

    if let Err(err) = upsert_user(&mut *txn, tables, record, location_id).await {
        return abandon(txn, RecordOutcome::PartialUser, err).await;
    }

    txn.commit().await.map_err(SyncError::Transaction)?;

    Ok(RecordOutcome::Completed)
}

/// Rolls the record's transaction back after a failed stage.
///
/// The failure is logged with enough context for manual reconciliation and
/// reported as the record's outcome, not raised: one bad record degrades
/// gracefully and never aborts its chunk.
async fn abandon(
    txn: Transaction<'_, Postgres>,
    outcome: RecordOutcome,
    err: SyncError,
) -> SyncResult<RecordOutcome> {
    warn!(error = %err, ?outcome, "record synchronization stopped early");

    txn.rollback().await.map_err(SyncError::Transaction)?;

    Ok(outcome)
}
