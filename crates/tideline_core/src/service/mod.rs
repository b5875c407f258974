//! Caller-facing use-case services.
//!
//! # Responsibility
//! - Orchestrate CSV ingest and store calls into use-case level APIs.
//! - Keep menu/UI layers decoupled from storage details.

pub mod record_service;
