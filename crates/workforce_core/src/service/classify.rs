//! Pure mapping from internal failures to the error taxonomy.

use crate::error::{ErrorKind, IngestError, CSV_ERROR_MSG, ENCODING_ERROR_MSG};
use crate::model::entity::ConstructError;
use crate::normalize::NormalizeError;
use crate::query::QueryAssetError;
use crate::repo::record_repo::RepoError;
use rusqlite::ffi;
use rusqlite::ErrorCode;
use std::os::raw::c_int;
use thiserror::Error;

// STRICT-table type violation; not every bundled header names it.
const SQLITE_CONSTRAINT_DATATYPE: c_int = ffi::SQLITE_CONSTRAINT | (12 << 8);

/// Any failure an ingestion call can hit before classification.
#[derive(Debug, Error)]
pub enum IngestFailure {
    #[error("normalize: {0}")]
    Normalize(#[from] NormalizeError),
    /// `index` is the zero-based position of the record in the call input.
    #[error("record {index}: {error}")]
    Construct { index: usize, error: ConstructError },
    #[error("storage: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("repository: {0}")]
    Repo(#[from] RepoError),
    #[error("query asset: {0}")]
    QueryAsset(#[from] QueryAssetError),
}

/// Maps a failure to its taxonomy error, keeping the failure as the cause.
pub fn classify(failure: IngestFailure) -> IngestError {
    let error = match &failure {
        IngestFailure::Normalize(NormalizeError::Encoding(_)) => {
            IngestError::new(ErrorKind::InvalidDataFormat).with_message(ENCODING_ERROR_MSG)
        }
        IngestFailure::Normalize(NormalizeError::Parse { .. }) => {
            IngestError::new(ErrorKind::InvalidDataFormat).with_message(CSV_ERROR_MSG)
        }
        IngestFailure::Normalize(NormalizeError::Write(_)) => {
            IngestError::new(ErrorKind::TransientFailure)
        }
        IngestFailure::Construct { .. } => IngestError::new(ErrorKind::InvalidDataFormat),
        IngestFailure::Storage(err) => IngestError::new(storage_error_kind(err)),
        IngestFailure::Repo(RepoError::Sqlite(err)) => IngestError::new(storage_error_kind(err)),
        IngestFailure::Repo(RepoError::UninitializedConnection { .. }) => {
            IngestError::new(ErrorKind::ConfigurationError)
        }
        IngestFailure::QueryAsset(_) => IngestError::new(ErrorKind::ConfigurationError),
    };
    error.with_cause(failure)
}

/// Taxonomy category for a storage-engine error.
pub fn storage_error_kind(err: &rusqlite::Error) -> ErrorKind {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::ConstraintViolation => constraint_kind(failure.extended_code),
            ErrorCode::TypeMismatch | ErrorCode::TooBig => ErrorKind::InvalidDataFormat,
            _ => ErrorKind::TransientFailure,
        },
        rusqlite::Error::ToSqlConversionFailure(_)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::Utf8Error(_)
        | rusqlite::Error::NulError(_) => ErrorKind::InvalidDataFormat,
        _ => ErrorKind::TransientFailure,
    }
}

fn constraint_kind(extended_code: c_int) -> ErrorKind {
    match extended_code {
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
            ErrorKind::DuplicateRecord
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ErrorKind::ReferenceNotFound,
        ffi::SQLITE_CONSTRAINT_NOTNULL
        | ffi::SQLITE_CONSTRAINT_CHECK
        | SQLITE_CONSTRAINT_DATATYPE => ErrorKind::InvalidDataFormat,
        _ => ErrorKind::TransientFailure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{INVALID_DATA_FORMAT_MSG, TRANSIENT_FAILURE_MSG};

    fn sqlite_failure(extended_code: c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error::new(extended_code),
            Some("constraint failed: secret.detail".to_string()),
        )
    }

    #[test]
    fn constraint_codes_map_to_taxonomy() {
        let cases = [
            (ffi::SQLITE_CONSTRAINT_PRIMARYKEY, ErrorKind::DuplicateRecord),
            (ffi::SQLITE_CONSTRAINT_UNIQUE, ErrorKind::DuplicateRecord),
            (ffi::SQLITE_CONSTRAINT_FOREIGNKEY, ErrorKind::ReferenceNotFound),
            (ffi::SQLITE_CONSTRAINT_NOTNULL, ErrorKind::InvalidDataFormat),
            (ffi::SQLITE_CONSTRAINT_CHECK, ErrorKind::InvalidDataFormat),
            (SQLITE_CONSTRAINT_DATATYPE, ErrorKind::InvalidDataFormat),
            (ffi::SQLITE_CONSTRAINT_TRIGGER, ErrorKind::TransientFailure),
        ];
        for (code, expected) in cases {
            assert_eq!(storage_error_kind(&sqlite_failure(code)), expected, "code {code}");
        }
    }

    #[test]
    fn busy_and_io_errors_are_transient() {
        assert_eq!(
            storage_error_kind(&sqlite_failure(ffi::SQLITE_BUSY)),
            ErrorKind::TransientFailure
        );
        assert_eq!(
            storage_error_kind(&sqlite_failure(ffi::SQLITE_IOERR)),
            ErrorKind::TransientFailure
        );
        assert_eq!(
            storage_error_kind(&rusqlite::Error::QueryReturnedNoRows),
            ErrorKind::TransientFailure
        );
    }

    #[test]
    fn classified_error_keeps_cause_but_not_in_message() {
        let err = classify(IngestFailure::Storage(sqlite_failure(ffi::SQLITE_LOCKED)));
        assert_eq!(err.kind(), ErrorKind::TransientFailure);
        assert_eq!(err.to_string(), TRANSIENT_FAILURE_MSG);
        assert!(err.cause().unwrap().to_string().contains("secret.detail"));
    }

    #[test]
    fn construction_and_parse_failures_are_invalid_data() {
        let err = classify(IngestFailure::Construct {
            index: 3,
            error: ConstructError::MissingField { field: "id" },
        });
        assert_eq!(err.kind(), ErrorKind::InvalidDataFormat);
        assert_eq!(err.message(), INVALID_DATA_FORMAT_MSG);

        let err = classify(IngestFailure::Normalize(NormalizeError::Parse {
            line: Some(1),
            message: "unterminated quoted field".to_string(),
        }));
        assert_eq!(err.kind(), ErrorKind::InvalidDataFormat);
        assert_eq!(err.message(), CSV_ERROR_MSG);
    }
}
