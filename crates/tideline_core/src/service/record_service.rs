//! Record management use-case service.
//!
//! # Responsibility
//! - Bridge the CSV source and the record store behind one caller-facing API.
//! - Translate the caller's 1-based positional view into store identities.
//!
//! # Invariants
//! - Position -> identity is re-resolved from a fresh full listing on every
//!   call; positions are never cached across mutations.
//! - Not-found outcomes are `Option`/`bool` results; errors are reserved for
//!   source and storage faults.
//! - Reload replaces the data set atomically: the source is parsed in full
//!   before the store is touched.

use crate::ingest::csv::{load_records, LoadError};
use crate::model::record::{RecordId, SurveyRecord};
use crate::repo::record_repo::{RecordRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure in a record management use-case.
#[derive(Debug)]
pub enum ServiceError {
    /// The CSV source was needed and could not be loaded.
    Load(LoadError),
    /// The underlying store failed.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<LoadError> for ServiceError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service over one record store and one CSV source path.
///
/// Constructed once and passed to whatever orchestrates calls; there is no
/// process-wide shared instance.
pub struct RecordService<R: RecordRepository> {
    repo: R,
    source_path: PathBuf,
    loaded: bool,
}

impl<R: RecordRepository> RecordService<R> {
    /// Creates a service over the given store and CSV source path.
    pub fn new(repo: R, source_path: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            source_path: source_path.into(),
            loaded: false,
        }
    }

    /// Returns the configured CSV source path.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Returns the number of persisted records.
    pub fn record_count(&self) -> ServiceResult<usize> {
        Ok(self.repo.count()?)
    }

    /// Populates an empty store from the CSV source, in file order.
    ///
    /// # Contract
    /// - A store that already holds records is left untouched.
    /// - The record cap is enforced by the loader, not re-checked here.
    /// - Fails with `LoadError::SourceNotFound` when population is required
    ///   and the source is missing.
    pub fn ensure_loaded(&mut self) -> ServiceResult<usize> {
        let existing = self.repo.count()?;
        if existing > 0 {
            self.loaded = true;
            return Ok(existing);
        }

        let records = load_records(&self.source_path)?;
        for record in &records {
            self.repo.insert(record)?;
        }
        self.loaded = true;
        info!(
            "event=initial_load module=service status=ok rows={}",
            records.len()
        );
        Ok(records.len())
    }

    /// Replaces the whole store with a fresh parse of the CSV source.
    ///
    /// Destructive: prior records, including manual edits, are gone on
    /// success. The source is parsed completely before the store is touched,
    /// so a load failure leaves prior contents intact.
    pub fn reload_from_source(&mut self) -> ServiceResult<usize> {
        let records = load_records(&self.source_path)?;
        let count = self.repo.replace_all(&records)?;
        self.loaded = true;
        info!("event=reload module=service status=ok rows={count}");
        Ok(count)
    }

    /// Returns the current full listing, identity ascending.
    ///
    /// Triggers the initial source load the first time it is needed.
    pub fn get_all(&mut self) -> ServiceResult<Vec<SurveyRecord>> {
        if !self.loaded {
            self.ensure_loaded()?;
        }
        Ok(self.repo.list_all()?)
    }

    /// Returns the record at 1-based position `n` in the current listing.
    ///
    /// `None` when `n` is outside `[1, record_count()]`. Positions are not
    /// stable across mutations; the listing is loaded fresh per call.
    pub fn get_by_position(&mut self, n: usize) -> ServiceResult<Option<SurveyRecord>> {
        let records = self.get_all()?;
        if n < 1 || n > records.len() {
            return Ok(None);
        }
        Ok(Some(records[n - 1].clone()))
    }

    /// Persists a new record and returns its assigned identity.
    pub fn create(&mut self, record: &SurveyRecord) -> ServiceResult<RecordId> {
        Ok(self.repo.insert(record)?)
    }

    /// Overwrites the record at 1-based position `n` with `record`'s fields.
    ///
    /// Resolves position to identity via a fresh full listing, an O(n) cost
    /// accepted for the bounded working set. `Ok(false)` when `n` is out of
    /// range; the identity at that position never changes.
    pub fn update_by_position(&mut self, n: usize, record: &SurveyRecord) -> ServiceResult<bool> {
        match self.resolve_position(n)? {
            Some(id) => Ok(self.repo.update(id, record)?),
            None => Ok(false),
        }
    }

    /// Deletes the record at 1-based position `n`.
    ///
    /// Same position resolution rule as `update_by_position`. Removal is
    /// immediate and irreversible; later positions shift down by one.
    pub fn delete_by_position(&mut self, n: usize) -> ServiceResult<bool> {
        match self.resolve_position(n)? {
            Some(id) => Ok(self.repo.delete(id)?),
            None => Ok(false),
        }
    }

    fn resolve_position(&mut self, n: usize) -> ServiceResult<Option<RecordId>> {
        let records = self.get_all()?;
        if n < 1 || n > records.len() {
            return Ok(None);
        }
        let id = records[n - 1].id.ok_or_else(|| {
            RepoError::InvalidData(format!("listed record at position {n} has no identity"))
        })?;
        Ok(Some(id))
    }
}
