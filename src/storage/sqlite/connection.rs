use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool over a single ledger file. Every connection enforces the
/// `results -> games` cascade.
pub fn open_pool(database_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    // snapshots are written whole by one engine, so one connection suffices
    r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .with_context(|| format!("Failed to open ledger database {}", database_path))
}

pub fn checkout(pool: &DbPool) -> Result<DbConn> {
    pool.get().context("Ledger database connection unavailable")
}
