//! Core domain logic for Tideline survey record management.
//! This crate is the single source of truth for persistence invariants.

pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use ingest::csv::{load_records, LoadError, LoadResult, CSV_HEADER, MAX_LOADED_RECORDS};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{RecordId, SurveyRecord};
pub use repo::csv_repo::{save_snapshot, CsvFileRepository};
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use service::record_service::{RecordService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
