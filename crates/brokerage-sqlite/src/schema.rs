use brokerage_core::error::{BrokerageError, Result};
use rusqlite::Connection;

/// Schema version written by this crate
pub const SCHEMA_VERSION: u32 = 1;

/// Create the projection tables if they do not exist yet
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS projection_meta (
            id INTEGER PRIMARY KEY CHECK (id = 0),
            schema_version INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS share_price_movements (
            movement_key TEXT PRIMARY KEY,
            share_id TEXT NOT NULL,
            activity_seconds INTEGER NOT NULL,
            activity_nanos INTEGER NOT NULL,
            created_seconds INTEGER NOT NULL,
            created_nanos INTEGER NOT NULL,
            inserted_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_movements_share
            ON share_price_movements(share_id, created_seconds);

        CREATE TABLE IF NOT EXISTS share_price_points (
            point_id INTEGER PRIMARY KEY AUTOINCREMENT,
            movement_key TEXT NOT NULL REFERENCES share_price_movements(movement_key),
            currency TEXT NOT NULL,
            units INTEGER NOT NULL,
            nanos INTEGER NOT NULL CHECK (nanos > -1000000000 AND nanos < 1000000000),
            time_seconds INTEGER NOT NULL,
            time_nanos INTEGER NOT NULL CHECK (time_nanos >= 0 AND time_nanos < 1000000000)
        );

        CREATE INDEX IF NOT EXISTS idx_points_movement
            ON share_price_points(movement_key, point_id);
        "#,
    )
    .map_err(|e| BrokerageError::Projection(e.to_string()))?;

    conn.execute(
        "INSERT OR IGNORE INTO projection_meta (id, schema_version) VALUES (0, ?1)",
        [SCHEMA_VERSION as i64],
    )
    .map_err(|e| BrokerageError::Projection(e.to_string()))?;

    Ok(())
}

/// Read the schema version from the metadata row
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn
        .query_row(
            "SELECT schema_version FROM projection_meta WHERE id = 0",
            [],
            |row| row.get(0),
        )
        .map_err(|e| BrokerageError::Query(e.to_string()))?;

    Ok(version as u32)
}
