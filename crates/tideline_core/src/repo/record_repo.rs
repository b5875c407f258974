//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over durable `survey_records` storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `insert` assigns a strictly increasing identity that is never reused.
//! - `update`/`delete` on a missing identity report `false`, not an error.
//! - `list_all` order is identity ascending and deterministic between
//!   mutations.

use crate::db::DbError;
use crate::model::record::{RecordId, SurveyRecord};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    site,
    year,
    transect,
    quadrat,
    species,
    count
FROM survey_records";

const RECORD_INSERT_SQL: &str = "INSERT INTO survey_records (
    site,
    year,
    transect,
    quadrat,
    species,
    count
) VALUES (?1, ?2, ?3, ?4, ?5, ?6);";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic store error for record persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Io(io::Error),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "record store i/o failed: {err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted record data: {message}")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<io::Error> for RepoError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Durable-store contract for survey records.
///
/// Implementations address records by store-assigned identity only; the
/// positional view callers see is owned by the service layer.
pub trait RecordRepository {
    /// Returns the number of persisted records.
    fn count(&self) -> RepoResult<usize>;
    /// Returns all records with identities, identity ascending.
    fn list_all(&self) -> RepoResult<Vec<SurveyRecord>>;
    /// Persists the six fields and returns the assigned identity.
    fn insert(&mut self, record: &SurveyRecord) -> RepoResult<RecordId>;
    /// Overwrites all six fields for `id`. `Ok(false)` when `id` is absent.
    fn update(&mut self, id: RecordId, record: &SurveyRecord) -> RepoResult<bool>;
    /// Removes the record with `id`. `Ok(false)` when `id` is absent.
    fn delete(&mut self, id: RecordId) -> RepoResult<bool>;
    /// Removes every record and restarts the identity sequence.
    fn clear_all(&mut self) -> RepoResult<()>;
    /// Atomically replaces the whole data set and returns the new count.
    ///
    /// Either all of `records` are persisted or the prior contents remain.
    fn replace_all(&mut self, records: &[SurveyRecord]) -> RepoResult<usize>;
}

/// SQLite-backed record store.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a store from a bootstrapped connection.
    ///
    /// # Errors
    /// - Rejects connections where the survey table or one of its columns
    ///   is missing, instead of failing later inside a query.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn count(&self) -> RepoResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM survey_records;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn list_all(&self) -> RepoResult<Vec<SurveyRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn insert(&mut self, record: &SurveyRecord) -> RepoResult<RecordId> {
        self.conn.execute(
            RECORD_INSERT_SQL,
            params![
                record.site,
                record.year,
                record.transect,
                record.quadrat,
                record.species,
                record.count,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&mut self, id: RecordId, record: &SurveyRecord) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE survey_records
             SET
                site = ?1,
                year = ?2,
                transect = ?3,
                quadrat = ?4,
                species = ?5,
                count = ?6
             WHERE id = ?7;",
            params![
                record.site,
                record.year,
                record.transect,
                record.quadrat,
                record.species,
                record.count,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&mut self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM survey_records WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn clear_all(&mut self) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        clear_in_tx(&tx)?;
        tx.commit()?;
        Ok(())
    }

    fn replace_all(&mut self, records: &[SurveyRecord]) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        clear_in_tx(&tx)?;
        for record in records {
            tx.execute(
                RECORD_INSERT_SQL,
                params![
                    record.site,
                    record.year,
                    record.transect,
                    record.quadrat,
                    record.species,
                    record.count,
                ],
            )?;
        }
        tx.commit()?;
        Ok(records.len())
    }
}

fn clear_in_tx(conn: &Connection) -> RepoResult<()> {
    conn.execute("DELETE FROM survey_records;", [])?;
    // sqlite_sequence only exists after the first AUTOINCREMENT insert.
    if table_exists(conn, "sqlite_sequence")? {
        conn.execute(
            "DELETE FROM sqlite_sequence WHERE name = 'survey_records';",
            [],
        )?;
    }
    Ok(())
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<SurveyRecord> {
    Ok(SurveyRecord {
        id: Some(row.get("id")?),
        site: row.get("site")?,
        year: row.get("year")?,
        transect: row.get("transect")?,
        quadrat: row.get("quadrat")?,
        species: row.get("species")?,
        count: row.get("count")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "survey_records")? {
        return Err(RepoError::MissingRequiredTable("survey_records"));
    }

    for column in ["id", "site", "year", "transect", "quadrat", "species", "count"] {
        if !table_has_column(conn, "survey_records", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "survey_records",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
