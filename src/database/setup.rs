use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create missing tables and indexes; existing data is left alone
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    conn.execute_batch(schema_sql)
        .context("Failed to apply database schema")?;

    log::debug!("Database schema is up to date");
    Ok(())
}
