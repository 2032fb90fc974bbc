//! Core library for the roster importer.
//!
//! Reads flat attendee records from a spreadsheet and idempotently
//! synchronizes them into the `groups`, `locations` and `users` tables of a
//! Postgres database, using concurrent chunk workers over a shared
//! connection pool.

pub mod error;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod sync;
#[cfg(feature = "test-utils")]
pub mod test_utils;
pub mod types;
pub mod workers;
