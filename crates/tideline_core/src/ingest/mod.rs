//! CSV source ingestion.
//!
//! # Responsibility
//! - Turn raw survey CSV lines into transient domain records.
//! - Keep the fixed-format parsing rules in one place.

pub mod csv;
