//! Spawning of isolated test databases.
//!
//! Each invocation creates a database with a unique name so concurrently
//! running tests cannot interfere, and creates the three destination tables
//! the way the collaborator-provided DDL defines them.

use config::shared::{PgConnectionConfig, TableNamesConfig, TlsConfig};
use sqlx::{Connection, PgConnection};
use uuid::Uuid;

/// DDL for the destination tables, mirroring the deployed schema.
const DESTINATION_TABLES_DDL: &[&str] = &[
    "CREATE TABLE groups (
        group_id BIGSERIAL PRIMARY KEY,
        group_name TEXT NOT NULL UNIQUE,
        description TEXT,
        creation_date DATE,
        updation_date DATE
    )",
    "CREATE TABLE locations (
        location_id BIGSERIAL PRIMARY KEY,
        location_name TEXT NOT NULL,
        address TEXT,
        city TEXT,
        country TEXT,
        group_id BIGINT NOT NULL REFERENCES groups (group_id),
        UNIQUE (location_name, group_id)
    )",
    "CREATE TABLE users (
        user_id BIGSERIAL PRIMARY KEY,
        user_name TEXT,
        email TEXT NOT NULL UNIQUE,
        phone_number TEXT,
        location_id BIGINT NOT NULL REFERENCES locations (location_id)
    )",
];

/// A throwaway database holding the three destination tables.
pub struct TestDatabase {
    /// Connection configuration pointing at the unique database.
    pub config: PgConnectionConfig,
    /// Destination table names, as created by the DDL above.
    pub tables: TableNamesConfig,
}

/// Generates connection configuration for an isolated test database.
///
/// Configuration is read from environment variables:
/// - `TESTS_DATABASE_HOST`: Postgres server hostname (required)
/// - `TESTS_DATABASE_PORT`: Postgres server port (required)
/// - `TESTS_DATABASE_USERNAME`: database user (required)
/// - `TESTS_DATABASE_PASSWORD`: database password (optional)
fn local_pg_connection_config() -> PgConnectionConfig {
    PgConnectionConfig {
        host: std::env::var("TESTS_DATABASE_HOST").expect("TESTS_DATABASE_HOST must be set"),
        port: std::env::var("TESTS_DATABASE_PORT")
            .expect("TESTS_DATABASE_PORT must be set")
            .parse()
            .expect("TESTS_DATABASE_PORT must be a valid port number"),
        // Unique database name for test isolation.
        name: format!("roster_test_{}", Uuid::new_v4().simple()),
        username: std::env::var("TESTS_DATABASE_USERNAME")
            .expect("TESTS_DATABASE_USERNAME must be set"),
        password: std::env::var("TESTS_DATABASE_PASSWORD")
            .ok()
            .map(Into::into),
        tls: TlsConfig {
            trusted_root_certs: String::new(),
            enabled: false,
        },
    }
}

/// Creates a uniquely named database with the destination tables in place.
///
/// # Panics
///
/// Panics if the database or its tables cannot be created.
pub async fn spawn_test_database() -> TestDatabase {
    let config = local_pg_connection_config();

    let mut admin = PgConnection::connect_with(&config.without_db())
        .await
        .expect("failed to connect to the maintenance database");
    sqlx::query(&format!(r#"CREATE DATABASE "{}""#, config.name))
        .execute(&mut admin)
        .await
        .expect("failed to create the test database");

    let database = TestDatabase {
        config,
        tables: TableNamesConfig::default(),
    };

    let mut conn = database.connect().await;
    for ddl in DESTINATION_TABLES_DDL {
        sqlx::query(ddl)
            .execute(&mut conn)
            .await
            .expect("failed to create a destination table");
    }

    database
}

impl TestDatabase {
    /// Opens a standalone connection to the test database.
    pub async fn connect(&self) -> PgConnection {
        PgConnection::connect_with(&self.config.with_db())
            .await
            .expect("failed to connect to the test database")
    }

    /// Runs one SQL statement against the test database.
    pub async fn run_sql(&self, sql: &str) {
        let mut conn = self.connect().await;
        sqlx::query(sql)
            .execute(&mut conn)
            .await
            .expect("failed to run SQL against the test database");
    }

    /// Returns the number of rows in the given table.
    pub async fn count_rows(&self, table: &str) -> i64 {
        let mut conn = self.connect().await;
        sqlx::query_scalar(&format!("SELECT count(*) FROM {table}"))
            .fetch_one(&mut conn)
            .await
            .expect("failed to count rows")
    }
}
