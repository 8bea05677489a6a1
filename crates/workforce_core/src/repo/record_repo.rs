//! Record insertion and read-back over the `departments`, `jobs` and
//! `employees` tables.

use crate::db::migrations::latest_version;
use crate::model::entity::{format_timestamp, ConstructError, Department, Employee, EntityKind, Job};
use crate::model::record::RawRecord;
use rusqlite::{params, Connection, Statement};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Connection schema is not at the expected migrated version.
    #[error("record repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

/// Typed record that can be built from a raw mapping and inserted as one row.
pub trait StorageRecord: Sized {
    const KIND: EntityKind;

    fn from_raw(raw: &RawRecord) -> Result<Self, ConstructError>;

    /// Parameterized `INSERT` for one row of this kind.
    fn insert_sql() -> &'static str;

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

impl StorageRecord for Department {
    const KIND: EntityKind = EntityKind::Department;

    fn from_raw(raw: &RawRecord) -> Result<Self, ConstructError> {
        Department::from_raw(raw)
    }

    fn insert_sql() -> &'static str {
        "INSERT INTO departments (id, name) VALUES (?1, ?2);"
    }

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.name.as_str()])
    }
}

impl StorageRecord for Job {
    const KIND: EntityKind = EntityKind::Job;

    fn from_raw(raw: &RawRecord) -> Result<Self, ConstructError> {
        Job::from_raw(raw)
    }

    fn insert_sql() -> &'static str {
        "INSERT INTO jobs (id, title) VALUES (?1, ?2);"
    }

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.title.as_str()])
    }
}

impl StorageRecord for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn from_raw(raw: &RawRecord) -> Result<Self, ConstructError> {
        Employee::from_raw(raw)
    }

    fn insert_sql() -> &'static str {
        "INSERT INTO employees (id, name, hired_at, department_id, job_id)
         VALUES (?1, ?2, ?3, ?4, ?5);"
    }

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.name.as_str(),
            self.hired_at.as_ref().map(format_timestamp),
            self.department_id,
            self.job_id,
        ])
    }
}

/// Inserts one constructed chunk into the open transaction behind `conn`.
///
/// Rows become visible to later statements on the same transaction but are
/// not durable until the caller commits.
pub fn insert_chunk<R: StorageRecord>(conn: &Connection, chunk: &[R]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(R::insert_sql())?;
    let mut inserted = 0;
    for record in chunk {
        inserted += record.insert(&mut stmt)?;
    }
    Ok(inserted)
}

/// Fails unless the connection carries the schema this crate writes to.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Number of committed rows of `kind`.
pub fn count_records(conn: &Connection, kind: EntityKind) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", kind.table()),
        [],
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Identifiers of every row of `kind`, ascending.
pub fn list_ids(conn: &Connection, kind: EntityKind) -> RepoResult<Vec<i64>> {
    let mut stmt = conn.prepare(&format!("SELECT id FROM {} ORDER BY id ASC;", kind.table()))?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}
