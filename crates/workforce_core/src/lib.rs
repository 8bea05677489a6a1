//! Core ingestion logic for department, job and employee records.
//! This crate owns the storage invariants: batch atomicity, classified
//! failures, and the delimited-file normalization that feeds ingestion.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, IngestConfig};
pub use error::{ErrorKind, IngestError, IngestResult};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, EventLog, FacadeLog,
    LogDestination, MemoryLog,
};
pub use model::entity::{ConstructError, Department, Employee, EntityKind, Job};
pub use model::record::RawRecord;
pub use normalize::{normalize, to_delimited_bytes, NormalizeError};
pub use query::{QueryCatalog, QueryRow, QueryRunner};
pub use repo::record_repo::{count_records, list_ids, StorageRecord};
pub use service::ingest_service::IngestService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
