use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;
use std::time::Duration;

use super::setup::ensure_schema;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the store file and make sure every table exists
pub fn create_pool(database_path: &str) -> Result<DbPool> {
    let manager = build_manager(database_path);
    let pool = build_pool(manager)?;
    let conn = get_connection(&pool)?;
    ensure_schema(&conn)?;
    Ok(pool)
}

fn build_manager(path: &str) -> SqliteConnectionManager {
    SqliteConnectionManager::file(path).with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT))
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    r2d2::Pool::builder()
        .max_size(4)
        .build(manager)
        .context("Failed to create database connection pool")
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}
