//! Per-entity idempotent upsert operations.
//!
//! Each operation is a single conditional write: insert the row, or update
//! its mutable attributes when the natural key already exists, returning the
//! surrogate id either way. Atomicity lives in the storage layer, so two
//! workers racing on the same natural key cannot produce duplicate rows and
//! no application-level locking is needed.

use config::shared::TableNamesConfig;
use pg_escape::quote_identifier;
use sqlx::PgExecutor;

use crate::error::{EntityKind, SyncError, SyncResult};
use crate::types::InputRecord;

/// Quoted destination table identifiers, ready to splice into SQL text.
///
/// Table names come from configuration, not from input records, and are
/// quoted once at construction. All record values are bound parameters.
#[derive(Debug, Clone)]
pub struct TableNames {
    groups: String,
    locations: String,
    users: String,
}

impl TableNames {
    /// Quotes the configured table names.
    pub fn new(config: &TableNamesConfig) -> Self {
        Self {
            groups: quote_identifier(&config.groups).into_owned(),
            locations: quote_identifier(&config.locations).into_owned(),
            users: quote_identifier(&config.users).into_owned(),
        }
    }
}

fn group_upsert_sql(tables: &TableNames) -> String {
    format!(
        "INSERT INTO {} (group_name, description, creation_date, updation_date) \
         VALUES ($1, $2, CURRENT_DATE, CURRENT_DATE) \
         ON CONFLICT (group_name) \
         DO UPDATE SET description = EXCLUDED.description, updation_date = CURRENT_DATE \
         RETURNING group_id",
        tables.groups
    )
}

fn location_upsert_sql(tables: &TableNames) -> String {
    format!(
        "INSERT INTO {} (location_name, address, city, country, group_id) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (location_name, group_id) \
         DO UPDATE SET address = EXCLUDED.address, city = EXCLUDED.city, \
         country = EXCLUDED.country \
         RETURNING location_id",
        tables.locations
    )
}

fn user_upsert_sql(tables: &TableNames) -> String {
    format!(
        "INSERT INTO {} (user_name, email, phone_number, location_id) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (email) \
         DO UPDATE SET user_name = EXCLUDED.user_name, \
         phone_number = EXCLUDED.phone_number, location_id = EXCLUDED.location_id \
         RETURNING user_id",
        tables.users
    )
}

/// Upserts the group row for a record and returns its id.
///
/// A first sighting of the group name inserts the row with both dates set to
/// today; later sightings update the description and bump `updation_date`.
pub async fn upsert_group<'c, E>(
    executor: E,
    tables: &TableNames,
    record: &InputRecord,
) -> SyncResult<i64>
where
    E: PgExecutor<'c>,
{
    let group_id: i64 = sqlx::query_scalar(&group_upsert_sql(tables))
        .bind(&record.group_name)
        .bind(&record.group_description)
        .fetch_one(executor)
        .await
        .map_err(|source| SyncError::Upsert {
            entity: EntityKind::Group,
            natural_key: record.group_name.clone(),
            source,
        })?;

    Ok(group_id)
}

/// Upserts the location row for a record and returns its id.
///
/// Locations are scoped to their group: the natural key is the pair
/// `(location_name, group_id)`, so identical location names under different
/// groups stay distinct rows.
pub async fn upsert_location<'c, E>(
    executor: E,
    tables: &TableNames,
    record: &InputRecord,
    group_id: i64,
) -> SyncResult<i64>
where
    E: PgExecutor<'c>,
{
    let location_id: i64 = sqlx::query_scalar(&location_upsert_sql(tables))
        .bind(&record.location_name)
        .bind(&record.location_address)
        .bind(&record.city)
        .bind(&record.country)
        .bind(group_id)
        .fetch_one(executor)
        .await
        .map_err(|source| SyncError::Upsert {
            entity: EntityKind::Location,
            natural_key: format!("{}@{group_id}", record.location_name),
            source,
        })?;

    Ok(location_id)
}

/// Upserts the user row for a record and returns its id.
///
/// The natural key is the globally unique email; a repeated sighting moves
/// the user to the latest record's location.
pub async fn upsert_user<'c, E>(
    executor: E,
    tables: &TableNames,
    record: &InputRecord,
    location_id: i64,
) -> SyncResult<i64>
where
    E: PgExecutor<'c>,
{
    let user_id: i64 = sqlx::query_scalar(&user_upsert_sql(tables))
        .bind(&record.user_name)
        .bind(&record.email)
        .bind(&record.phone_number)
        .bind(location_id)
        .fetch_one(executor)
        .await
        .map_err(|source| SyncError::Upsert {
            entity: EntityKind::User,
            natural_key: record.email.clone(),
            source,
        })?;

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> TableNames {
        TableNames::new(&TableNamesConfig {
            groups: "workshop_groups".to_owned(),
            locations: "workshop_locations".to_owned(),
            users: "workshop_users".to_owned(),
        })
    }

    #[test]
    fn group_statement_targets_the_natural_key() {
        let sql = group_upsert_sql(&tables());

        assert!(sql.starts_with("INSERT INTO workshop_groups "));
        assert!(sql.contains("ON CONFLICT (group_name)"));
        assert!(sql.contains("updation_date = CURRENT_DATE"));
        assert!(sql.ends_with("RETURNING group_id"));
    }

    #[test]
    fn location_statement_targets_the_scoped_natural_key() {
        let sql = location_upsert_sql(&tables());

        assert!(sql.contains("ON CONFLICT (location_name, group_id)"));
        assert!(sql.ends_with("RETURNING location_id"));
    }

    #[test]
    fn user_statement_targets_the_email_key() {
        let sql = user_upsert_sql(&tables());

        assert!(sql.contains("ON CONFLICT (email)"));
        assert!(sql.contains("location_id = EXCLUDED.location_id"));
        assert!(sql.ends_with("RETURNING user_id"));
    }

    #[test]
    fn unusual_table_names_are_quoted() {
        let config = TableNamesConfig {
            groups: "Workshop Groups".to_owned(),
            locations: "locations".to_owned(),
            users: "users".to_owned(),
        };

        let tables = TableNames::new(&config);
        let sql = group_upsert_sql(&tables);

        assert!(sql.starts_with("INSERT INTO \"Workshop Groups\" "));
    }
}
