use anyhow::{Context, Result};
use rusqlite::{params, Connection};

pub mod columns;
pub mod connection;
pub mod games;
pub mod players;
pub mod projects;
pub mod schedules;
pub mod setup;
pub mod squads;
pub mod users;
pub mod watchlist;

pub use connection::{create_pool, get_connection, DbConn, DbPool};

/// One entity collection in the store: full-record upsert keyed by id
pub trait Table {
    type Record;

    const NAME: &'static str;

    /// Every record in the collection's default order
    fn list(conn: &Connection) -> Result<Vec<Self::Record>>;

    /// Replace the record with the same id, creating it when absent
    fn upsert(conn: &Connection, record: &Self::Record) -> Result<()>;

    fn delete(conn: &Connection, id: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", Self::NAME);
        conn.execute(&sql, params![id])
            .with_context(|| format!("Failed to delete from {}", Self::NAME))
            .map(|_| ())
    }
}
