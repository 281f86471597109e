use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::columns::enum_column;
use super::Table;
use crate::domain::{WatchStatus, WatchlistItem};

pub struct WatchlistTable;

impl Table for WatchlistTable {
    type Record = WatchlistItem;

    const NAME: &'static str = "watchlist";

    fn list(conn: &Connection) -> Result<Vec<WatchlistItem>> {
        let sql = "SELECT id, player_id, assigned_analyst_id, requested_by, status, note, created_at FROM watchlist ORDER BY created_at DESC";

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], parse_item_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list watchlist")?;

        Ok(rows)
    }

    fn upsert(conn: &Connection, item: &WatchlistItem) -> Result<()> {
        let sql = "INSERT OR REPLACE INTO watchlist (id, player_id, assigned_analyst_id, requested_by, status, note, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

        conn.execute(
            sql,
            params![
                item.id,
                item.player_id,
                item.assigned_analyst_id,
                item.requested_by,
                item.status.as_str(),
                item.note,
                item.created_at
            ],
        )
        .context("Failed to upsert watchlist item")?;

        Ok(())
    }
}

fn parse_item_row(row: &rusqlite::Row) -> rusqlite::Result<WatchlistItem> {
    Ok(WatchlistItem {
        id: row.get(0)?,
        player_id: row.get(1)?,
        assigned_analyst_id: row.get(2)?,
        requested_by: row.get(3)?,
        status: enum_column(row, 4)?,
        note: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Returns whether a row with that id existed
pub fn update_status(conn: &Connection, id: &str, status: WatchStatus) -> Result<bool> {
    let sql = "UPDATE watchlist SET status = ?1 WHERE id = ?2";

    let changed = conn
        .execute(sql, params![status.as_str(), id])
        .context("Failed to update watchlist status")?;

    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::ensure_schema;
    use chrono::Utc;

    #[test]
    fn test_update_status() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let item = WatchlistItem {
            id: "w1".to_string(),
            player_id: "p1".to_string(),
            assigned_analyst_id: "u1".to_string(),
            requested_by: "u0".to_string(),
            status: WatchStatus::Pending,
            note: Some("Ver contra o Bahia".to_string()),
            created_at: Utc::now(),
        };
        WatchlistTable::upsert(&conn, &item).unwrap();

        assert!(update_status(&conn, "w1", WatchStatus::Viewed).unwrap());
        assert!(!update_status(&conn, "missing", WatchStatus::Viewed).unwrap());

        let items = WatchlistTable::list(&conn).unwrap();
        assert_eq!(items[0].status, WatchStatus::Viewed);
    }
}
