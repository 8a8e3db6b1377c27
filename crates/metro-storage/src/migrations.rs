//! Database schema migrations.
//!
//! Attribute tables are named by configuration, so versions are tracked per
//! table in `schema_migrations`.

use rusqlite::Connection;
use tracing::info;

use metro_core::error::MetroError;

/// Latest schema version for an attribute table.
pub const CURRENT_VERSION: i64 = 1;

/// Create the migrations tracking table.
pub fn init_tracking(conn: &Connection) -> Result<(), MetroError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            table_name  TEXT NOT NULL,
            version     INTEGER NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            PRIMARY KEY (table_name, version)
        );",
    )
    .map_err(|e| MetroError::Storage(format!("Failed to create migrations table: {}", e)))
}

/// Bring the attribute table `table` up to `CURRENT_VERSION`.
///
/// `table` must already be validated as a plain identifier.
pub fn run_migrations(conn: &Connection, table: &str) -> Result<(), MetroError> {
    init_tracking(conn)?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations WHERE table_name = ?1",
            [table],
            |row| row.get(0),
        )
        .map_err(|e| MetroError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn, table)?;
        info!(table, "Applied migration v1: user_attributes");
    }

    Ok(())
}

/// Version 1: one JSON attribute document per user.
fn apply_v1(conn: &Connection, table: &str) -> Result<(), MetroError> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            user_id     TEXT PRIMARY KEY NOT NULL,
            attributes  TEXT NOT NULL,
            updated_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
        INSERT INTO schema_migrations (table_name, version) VALUES ('{table}', 1);"
    ))
    .map_err(|e| MetroError::Storage(format!("Failed to apply migration v1: {}", e)))
}
