//! Runtime configuration for the ingestion core.
//!
//! # Responsibility
//! - Read tunables from the environment once, at process startup.
//! - Reject invalid values before any ingestion call can observe them.
//!
//! # Invariants
//! - `batch_size` is always positive.

use crate::logging::default_log_level;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_DB_PATH: &str = "workforce.sqlite3";

pub const BATCH_SIZE_VAR: &str = "BATCH_SIZE";
pub const DB_PATH_VAR: &str = "DB_PATH";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "LOG_DIR";
pub const QUERY_DIR_VAR: &str = "QUERY_DIR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got `{value}`")]
    InvalidBatchSize { var: &'static str, value: String },
    #[error("{var} cannot be empty")]
    Empty { var: &'static str },
}

/// Startup configuration shared by every ingestion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Maximum records per flushed chunk.
    pub batch_size: NonZeroUsize,
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<PathBuf>,
    /// Directory of `<name>.sql` files overriding the embedded query assets.
    pub query_dir: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            query_dir: None,
        }
    }
}

impl IngestConfig {
    /// Builds configuration from process environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError` when `BATCH_SIZE` is zero, negative, or not a number,
    /// or when a path variable is set but blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(BATCH_SIZE_VAR) {
            config.batch_size = parse_batch_size(&raw)?;
        }
        if let Some(raw) = lookup(DB_PATH_VAR) {
            config.db_path = non_empty_path(DB_PATH_VAR, &raw)?;
        }
        if let Some(raw) = lookup(LOG_LEVEL_VAR) {
            if !raw.trim().is_empty() {
                config.log_level = raw.trim().to_string();
            }
        }
        if let Some(raw) = lookup(LOG_DIR_VAR) {
            config.log_dir = Some(non_empty_path(LOG_DIR_VAR, &raw)?);
        }
        if let Some(raw) = lookup(QUERY_DIR_VAR) {
            config.query_dir = Some(non_empty_path(QUERY_DIR_VAR, &raw)?);
        }

        Ok(config)
    }
}

pub fn default_batch_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN)
}

/// Parses a chunk size, accepting only strictly positive integers.
pub fn parse_batch_size(raw: &str) -> Result<NonZeroUsize, ConfigError> {
    raw.trim()
        .parse::<NonZeroUsize>()
        .map_err(|_| ConfigError::InvalidBatchSize {
            var: BATCH_SIZE_VAR,
            value: raw.to_string(),
        })
}

fn non_empty_path(var: &'static str, raw: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { var });
    }
    Ok(PathBuf::from(trimmed))
}
