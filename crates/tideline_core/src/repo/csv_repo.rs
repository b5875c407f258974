//! Flat-file record store and snapshot export.
//!
//! # Responsibility
//! - Provide the store contract over a single CSV data file, as an
//!   alternative to the SQLite backend.
//! - Export timestamp/UUID-named snapshots of a record set.
//!
//! # Invariants
//! - The identity sequence is persisted in the file (`#next_id=` line), so
//!   identities survive restarts and are never reused after deletes.
//! - Every operation opens, reads/writes and releases the file within the
//!   call; nothing is held between operations.
//! - Mutations rewrite the whole file in one write, so a replace either
//!   lands completely or not at all.

use crate::ingest::csv::{parse_line, to_csv_row, CSV_HEADER};
use crate::model::record::{RecordId, SurveyRecord};
use crate::repo::record_repo::{RecordRepository, RepoError, RepoResult};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const NEXT_ID_PREFIX: &str = "#next_id=";
const DATA_HEADER: &str = "id,site,year,transect,quadrat,species,count";

/// CSV-file-backed record store.
///
/// The working set is bounded by the source cap, so full-file rewrites per
/// mutation stay cheap.
pub struct CsvFileRepository {
    path: PathBuf,
}

struct FileState {
    next_id: RecordId,
    records: Vec<SurveyRecord>,
}

impl CsvFileRepository {
    /// Opens a file store, creating the data file when absent.
    ///
    /// Safe to call on every process start.
    pub fn create(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            write_state(
                &path,
                &FileState {
                    next_id: 1,
                    records: Vec::new(),
                },
            )?;
        }
        Ok(Self { path })
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> RepoResult<FileState> {
        let raw = fs::read_to_string(&self.path)?;
        let mut lines = raw.lines();

        let next_id = match lines.next() {
            Some(line) if line.starts_with(NEXT_ID_PREFIX) => line[NEXT_ID_PREFIX.len()..]
                .trim()
                .parse::<RecordId>()
                .map_err(|_| {
                    RepoError::InvalidData(format!(
                        "invalid identity sequence line `{line}` in {}",
                        self.path.display()
                    ))
                })?,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "missing identity sequence line in {}, found `{}`",
                    self.path.display(),
                    other.unwrap_or("")
                )));
            }
        };

        // Header row follows the sequence line; contents are not re-validated.
        let _ = lines.next();

        let mut records = Vec::new();
        for line in lines {
            records.push(parse_data_row(line, &self.path)?);
        }
        records.sort_by_key(|record| record.id);
        Ok(FileState { next_id, records })
    }
}

impl RecordRepository for CsvFileRepository {
    fn count(&self) -> RepoResult<usize> {
        Ok(self.read_state()?.records.len())
    }

    fn list_all(&self) -> RepoResult<Vec<SurveyRecord>> {
        Ok(self.read_state()?.records)
    }

    fn insert(&mut self, record: &SurveyRecord) -> RepoResult<RecordId> {
        let mut state = self.read_state()?;
        let id = state.next_id;
        let mut persisted = record.clone();
        persisted.id = Some(id);
        state.records.push(persisted);
        state.next_id += 1;
        write_state(&self.path, &state)?;
        Ok(id)
    }

    fn update(&mut self, id: RecordId, record: &SurveyRecord) -> RepoResult<bool> {
        let mut state = self.read_state()?;
        let Some(existing) = state
            .records
            .iter_mut()
            .find(|candidate| candidate.id == Some(id))
        else {
            return Ok(false);
        };
        *existing = SurveyRecord {
            id: Some(id),
            ..record.clone()
        };
        write_state(&self.path, &state)?;
        Ok(true)
    }

    fn delete(&mut self, id: RecordId) -> RepoResult<bool> {
        let mut state = self.read_state()?;
        let before = state.records.len();
        state.records.retain(|candidate| candidate.id != Some(id));
        if state.records.len() == before {
            return Ok(false);
        }
        write_state(&self.path, &state)?;
        Ok(true)
    }

    fn clear_all(&mut self) -> RepoResult<()> {
        write_state(
            &self.path,
            &FileState {
                next_id: 1,
                records: Vec::new(),
            },
        )
    }

    fn replace_all(&mut self, records: &[SurveyRecord]) -> RepoResult<usize> {
        let mut persisted = Vec::with_capacity(records.len());
        for (offset, record) in records.iter().enumerate() {
            let mut entry = record.clone();
            entry.id = Some(offset as RecordId + 1);
            persisted.push(entry);
        }
        let state = FileState {
            next_id: records.len() as RecordId + 1,
            records: persisted,
        };
        write_state(&self.path, &state)?;
        Ok(records.len())
    }
}

/// Writes a timestamp/UUID-named CSV snapshot of `records` under `dir`.
///
/// The snapshot carries the header and the six tracked fields per row, not
/// store identities. Returns the generated file path.
pub fn save_snapshot(dir: impl AsRef<Path>, records: &[SurveyRecord]) -> RepoResult<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let epoch_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let name = format!("survey-{epoch_secs}-{}.csv", Uuid::new_v4());
    let path = dir.join(name);

    let mut contents = String::from(CSV_HEADER);
    contents.push('\n');
    for record in records {
        contents.push_str(&to_csv_row(record));
        contents.push('\n');
    }
    fs::write(&path, contents)?;

    info!(
        "event=snapshot_saved module=repo status=ok path={} rows={}",
        path.display(),
        records.len()
    );
    Ok(path)
}

fn parse_data_row(line: &str, path: &Path) -> RepoResult<SurveyRecord> {
    let Some((id_text, fields)) = line.split_once(',') else {
        return Err(invalid_row(line, path));
    };
    let id = id_text
        .parse::<RecordId>()
        .map_err(|_| invalid_row(line, path))?;
    let record = parse_line(fields).ok_or_else(|| invalid_row(line, path))?;
    Ok(SurveyRecord {
        id: Some(id),
        ..record
    })
}

fn invalid_row(line: &str, path: &Path) -> RepoError {
    RepoError::InvalidData(format!("invalid row `{line}` in {}", path.display()))
}

fn write_state(path: &Path, state: &FileState) -> RepoResult<()> {
    let mut contents = format!("{NEXT_ID_PREFIX}{}\n{DATA_HEADER}\n", state.next_id);
    for record in &state.records {
        let id = record.id.ok_or_else(|| {
            RepoError::InvalidData("record without identity in file store".to_string())
        })?;
        contents.push_str(&format!("{id},{}\n", to_csv_row(record)));
    }
    fs::write(path, contents)?;
    Ok(())
}
