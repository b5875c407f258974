//! Fixed-format CSV loading for survey sources.
//!
//! # Responsibility
//! - Load survey rows from a comma-separated source file into transient
//!   records, tolerating malformed lines.
//! - Own the textual row representation used by file stores and exports.
//!
//! # Invariants
//! - Line 0 is a header and is always discarded.
//! - Splitting is a naive comma split; quoting and escaping are out of scope
//!   for this fixed-format source data.
//! - A malformed line is skipped with a warning and never fails the load.
//! - At most `MAX_LOADED_RECORDS` records are produced per load.

use crate::model::record::SurveyRecord;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on records taken from one source file.
pub const MAX_LOADED_RECORDS: usize = 100;

/// Column names of the tracked fields, in source order.
pub const CSV_HEADER: &str = "site,year,transect,quadrat,species,count";

/// Number of leading fields a data line must provide.
const REQUIRED_FIELDS: usize = 6;

pub type LoadResult<T> = Result<T, LoadError>;

/// Failure loading a CSV source file.
///
/// Per-row parse problems are not errors; they are skipped at the row level.
#[derive(Debug)]
pub enum LoadError {
    /// The source path does not exist.
    SourceNotFound(PathBuf),
    /// The source exists but could not be read.
    Io(io::Error),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound(path) => {
                write!(f, "csv source not found: {}", path.display())
            }
            Self::Io(err) => write!(f, "csv source read failed: {err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SourceNotFound(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Loads up to `MAX_LOADED_RECORDS` records from a CSV source file.
///
/// # Contract
/// - Returns `LoadError::SourceNotFound` when `path` does not exist.
/// - Discards the first line as a header unconditionally.
/// - Yields records in file order; every record is transient (no identity).
/// - Lines with fewer than six fields are logged and skipped.
pub fn load_records(path: impl AsRef<Path>) -> LoadResult<Vec<SurveyRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(
            "event=csv_load module=ingest status=error error_code=source_not_found path={}",
            path.display()
        );
        return Err(LoadError::SourceNotFound(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path)?;
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_index, line) in raw.lines().enumerate().skip(1) {
        if records.len() >= MAX_LOADED_RECORDS {
            break;
        }
        match parse_line(line) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                warn!(
                    "event=csv_row_skipped module=ingest status=warn line={} path={}",
                    line_index + 1,
                    path.display()
                );
            }
        }
    }

    info!(
        "event=csv_load module=ingest status=ok path={} rows={} skipped={}",
        path.display(),
        records.len(),
        skipped
    );
    Ok(records)
}

/// Parses one data line into a transient record.
///
/// Returns `None` when the line has fewer than six comma-separated fields.
/// Fields beyond the sixth are ignored; kept fields are trimmed.
pub fn parse_line(line: &str) -> Option<SurveyRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < REQUIRED_FIELDS {
        return None;
    }
    Some(SurveyRecord::new(
        fields[0].trim(),
        fields[1].trim(),
        fields[2].trim(),
        fields[3].trim(),
        fields[4].trim(),
        fields[5].trim(),
    ))
}

/// Serializes the six tracked fields back to one CSV data line.
pub fn to_csv_row(record: &SurveyRecord) -> String {
    record.field_values().join(",")
}
