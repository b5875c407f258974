//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Create the survey table when absent and set connection pragmas.
//!
//! # Invariants
//! - Returned connections are ready for repository use without further setup.
//! - Table creation is idempotent (`CREATE TABLE IF NOT EXISTS`).

use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS survey_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site TEXT NOT NULL,
    year TEXT NOT NULL,
    transect TEXT NOT NULL,
    quadrat TEXT NOT NULL,
    species TEXT NOT NULL,
    count TEXT NOT NULL
);";

/// Opens a SQLite database file and ensures the survey table exists.
///
/// # Side effects
/// - Creates the database file and table on first use.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path.as_ref()))
}

/// Opens an in-memory SQLite database and ensures the survey table exists.
///
/// Used by tests and short-lived tooling; same bootstrap as `open_db`.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    opener: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = opener()
        .map_err(Into::into)
        .and_then(|conn| bootstrap_connection(conn));
    match result {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: Connection) -> DbResult<Connection> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(conn)
}
