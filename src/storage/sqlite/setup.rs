use anyhow::{Context, Result, bail};
use log::{debug, info};
use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

/// Bumped whenever `schema.sql` changes shape.
pub const SCHEMA_VERSION: i64 = 1;

/// Creates the ledger tables on a fresh file and refuses files written by a
/// newer schema.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        bail!(
            "Database schema version {} is newer than supported version {}",
            found,
            SCHEMA_VERSION
        );
    }

    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let object = statement.lines().next().unwrap_or(statement);
        conn.execute_batch(statement)
            .with_context(|| format!("Failed to apply `{}`", object))?;
        debug!("Applied `{}`", object);
    }

    if found < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .context("Failed to record schema version")?;
        info!("Ledger schema upgraded from version {} to {}", found, SCHEMA_VERSION);
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("Failed to read schema version")
}
