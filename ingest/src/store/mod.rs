//! Postgres-backed storage: the shared connection pool and the per-entity
//! upsert operations.

mod pool;
mod upsert;

pub use pool::StorePool;
pub use upsert::{TableNames, upsert_group, upsert_location, upsert_user};
