//! Typed department/job/employee records and their constructors.
//!
//! # Responsibility
//! - Translate one raw field mapping into a storage-ready record.
//! - Apply null-coercion for nullable columns and type coercion for
//!   identifiers and timestamps.
//!
//! # Invariants
//! - Every column must be present; a blank value in a nullable column
//!   becomes `None`.
//! - Non-nullable text columns pass through verbatim, empty included.
//! - A field outside the entity's column set is rejected.

use super::record::RawRecord;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Failure turning a raw mapping into a typed record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("unexpected field `{field}`")]
    UnexpectedField { field: String },
    #[error("field `{field}` expects {expected}, got `{value}`")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// The three persisted entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Department,
    Job,
    Employee,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Department, Self::Job, Self::Employee];

    /// Storage table holding this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Department => Department::TABLE,
            Self::Job => Job::TABLE,
            Self::Employee => Employee::TABLE,
        }
    }

    /// Expected delimited-file columns, in storage order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Department => Department::COLUMNS,
            Self::Job => Job::COLUMNS,
            Self::Employee => Employee::COLUMNS,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Department => "department",
            Self::Job => "job",
            Self::Employee => "employee",
        };
        f.write_str(name)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "department" | "departments" => Ok(Self::Department),
            "job" | "jobs" => Ok(Self::Job),
            "employee" | "employees" => Ok(Self::Employee),
            other => Err(format!(
                "unknown entity kind `{other}`; expected departments|jobs|employees"
            )),
        }
    }
}

/// Organizational department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// Job title an employee can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: i64,
    pub title: String,
}

/// Hired employee, referencing one department and one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub hired_at: Option<DateTime<Utc>>,
    pub department_id: Option<i64>,
    pub job_id: Option<i64>,
}

impl Department {
    pub const TABLE: &'static str = "departments";
    pub const COLUMNS: &'static [&'static str] = &["id", "name"];

    pub fn from_raw(raw: &RawRecord) -> Result<Self, ConstructError> {
        reject_unknown_fields(raw, Self::COLUMNS)?;
        Ok(Self {
            id: required_id(raw, "id")?,
            name: required_text(raw, "name")?,
        })
    }
}

impl Job {
    pub const TABLE: &'static str = "jobs";
    pub const COLUMNS: &'static [&'static str] = &["id", "title"];

    pub fn from_raw(raw: &RawRecord) -> Result<Self, ConstructError> {
        reject_unknown_fields(raw, Self::COLUMNS)?;
        Ok(Self {
            id: required_id(raw, "id")?,
            title: required_text(raw, "title")?,
        })
    }
}

impl Employee {
    pub const TABLE: &'static str = "employees";
    pub const COLUMNS: &'static [&'static str] =
        &["id", "name", "hired_at", "department_id", "job_id"];

    pub fn from_raw(raw: &RawRecord) -> Result<Self, ConstructError> {
        reject_unknown_fields(raw, Self::COLUMNS)?;
        Ok(Self {
            id: required_id(raw, "id")?,
            name: required_text(raw, "name")?,
            hired_at: nullable(raw, "hired_at")?
                .map(|value| parse_timestamp("hired_at", value))
                .transpose()?,
            department_id: nullable(raw, "department_id")?
                .map(|value| parse_id("department_id", value))
                .transpose()?,
            job_id: nullable(raw, "job_id")?
                .map(|value| parse_id("job_id", value))
                .transpose()?,
        })
    }
}

/// Renders a timestamp the way it is stored: RFC 3339, UTC, `Z` suffix.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses RFC 3339 or a naive `YYYY-MM-DD[T ]HH:MM:SS` timestamp as UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ConstructError> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ConstructError::TypeMismatch {
            field,
            expected: "a timestamp",
            value: value.to_string(),
        })
}

fn parse_id(field: &'static str, value: &str) -> Result<i64, ConstructError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ConstructError::TypeMismatch {
            field,
            expected: "an integer",
            value: value.to_string(),
        })
}

fn required_id(raw: &RawRecord, field: &'static str) -> Result<i64, ConstructError> {
    let value = raw.get(field).ok_or(ConstructError::MissingField { field })?;
    parse_id(field, value)
}

fn required_text(raw: &RawRecord, field: &'static str) -> Result<String, ConstructError> {
    raw.get(field)
        .map(str::to_string)
        .ok_or(ConstructError::MissingField { field })
}

// Absent is a missing field; present but blank is NULL.
fn nullable<'a>(raw: &'a RawRecord, field: &'static str) -> Result<Option<&'a str>, ConstructError> {
    raw.get(field)
        .map(|value| Some(value).filter(|value| !value.trim().is_empty()))
        .ok_or(ConstructError::MissingField { field })
}

fn reject_unknown_fields(raw: &RawRecord, columns: &[&str]) -> Result<(), ConstructError> {
    match raw.fields().find(|field| !columns.contains(field)) {
        Some(field) => Err(ConstructError::UnexpectedField {
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}
