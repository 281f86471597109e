use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::columns::{json_column, to_json};
use crate::domain::ShadowSquad;

/// Squad saved for `viewer_id`, if any
pub fn load(conn: &Connection, viewer_id: &str) -> Result<Option<ShadowSquad>> {
    let sql = "SELECT slots FROM shadow_squads WHERE viewer_id = ?1";

    conn.query_row(sql, params![viewer_id], |row| json_column(row, 0))
        .optional()
        .with_context(|| format!("Failed to load shadow squad for {}", viewer_id))
}

pub fn save(conn: &Connection, viewer_id: &str, squad: &ShadowSquad) -> Result<()> {
    let sql = "INSERT OR REPLACE INTO shadow_squads (viewer_id, slots, updated_at) VALUES (?1, ?2, ?3)";

    conn.execute(sql, params![viewer_id, to_json(squad)?, Utc::now()])
        .with_context(|| format!("Failed to save shadow squad for {}", viewer_id))?;

    Ok(())
}
