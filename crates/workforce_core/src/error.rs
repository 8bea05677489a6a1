//! Caller-facing error taxonomy.
//!
//! # Responsibility
//! - Define the stable set of failure categories crossing the API boundary.
//! - Carry the original cause for diagnostics without ever rendering it.
//!
//! # Invariants
//! - `Display` shows only a fixed message; `source()` is always `None`.
//! - `Debug` omits the cause text.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

pub const DUPLICATE_RECORD_MSG: &str = "Duplicate record found";
pub const REFERENCE_NOT_FOUND_MSG: &str = "Referenced department or job does not exist";
pub const INVALID_DATA_FORMAT_MSG: &str =
    "Invalid data format, check the field types and values of the records";
pub const ENCODING_ERROR_MSG: &str =
    "An error occurred reading the file, check file invalid characters";
pub const CSV_ERROR_MSG: &str = "There was an error processing the CSV file. Please check the file for any formatting issues, such as incorrect commas or quotes.";
pub const TRANSIENT_FAILURE_MSG: &str =
    "An error occurred while processing the request, please try again later";
pub const CONFIGURATION_ERROR_MSG: &str =
    "The service is misconfigured, contact the administrator";

pub type IngestResult<T> = Result<T, IngestError>;

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Stable failure category returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateRecord,
    ReferenceNotFound,
    InvalidDataFormat,
    TransientFailure,
    ConfigurationError,
}

impl ErrorKind {
    /// Stable code for logs and machine consumers.
    pub fn code(self) -> &'static str {
        match self {
            Self::DuplicateRecord => "duplicate_record",
            Self::ReferenceNotFound => "reference_not_found",
            Self::InvalidDataFormat => "invalid_data_format",
            Self::TransientFailure => "transient_failure",
            Self::ConfigurationError => "configuration_error",
        }
    }

    /// Default fixed message for this category.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::DuplicateRecord => DUPLICATE_RECORD_MSG,
            Self::ReferenceNotFound => REFERENCE_NOT_FOUND_MSG,
            Self::InvalidDataFormat => INVALID_DATA_FORMAT_MSG,
            Self::TransientFailure => TRANSIENT_FAILURE_MSG,
            Self::ConfigurationError => CONFIGURATION_ERROR_MSG,
        }
    }
}

/// Classified ingestion or query failure.
#[derive(Error)]
#[error("{message}")]
pub struct IngestError {
    kind: ErrorKind,
    message: &'static str,
    cause: Option<Cause>,
}

impl IngestError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message(),
            cause: None,
        }
    }

    /// Replaces the fixed message with another fixed message of the same kind.
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = message;
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Original failure, for diagnostics only; never forward it to callers.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl Debug for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("has_cause", &self.cause.is_some())
            .finish()
    }
}
