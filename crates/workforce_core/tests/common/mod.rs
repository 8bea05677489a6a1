#![allow(dead_code)]

use rusqlite::Connection;
use std::num::NonZeroUsize;
use std::sync::Arc;
use workforce_core::db::open_db_in_memory;
use workforce_core::{IngestService, MemoryLog, RawRecord};

pub const BATCH_SIZE: usize = 1000;

pub fn batch_size(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap()
}

pub fn memory_db() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn service(conn: &Connection, size: usize) -> (IngestService<'_>, Arc<MemoryLog>) {
    let log = Arc::new(MemoryLog::new());
    let service = IngestService::try_new(conn, batch_size(size), log.clone()).unwrap();
    (service, log)
}

pub fn departments(size: usize) -> Vec<RawRecord> {
    (0..size)
        .map(|i| {
            RawRecord::new()
                .with("id", i.to_string())
                .with("name", format!("department{i}"))
        })
        .collect()
}

/// `size` valid departments followed by one reusing id 1.
pub fn departments_with_duplicate_id(size: usize) -> Vec<RawRecord> {
    let mut records = departments(size);
    records.push(RawRecord::new().with("id", "1").with("name", "department"));
    records
}

/// `size` valid departments followed by one reusing the name `department1`.
pub fn departments_with_duplicate_name(size: usize) -> Vec<RawRecord> {
    let mut records = departments(size);
    records.push(
        RawRecord::new()
            .with("id", (size + 1).to_string())
            .with("name", "department1"),
    );
    records
}

pub fn jobs(size: usize) -> Vec<RawRecord> {
    (0..size)
        .map(|i| {
            RawRecord::new()
                .with("id", i.to_string())
                .with("title", format!("job{i}"))
        })
        .collect()
}

pub fn jobs_with_duplicate_id(size: usize) -> Vec<RawRecord> {
    let mut records = jobs(size);
    records.push(RawRecord::new().with("id", "1").with("title", "job"));
    records
}

/// Employees spread over departments `0..departments` and jobs `0..jobs`,
/// hired across the months of 2021.
pub fn employees(size: usize, departments: usize, jobs: usize) -> Vec<RawRecord> {
    (0..size)
        .map(|i| {
            RawRecord::new()
                .with("id", i.to_string())
                .with("name", format!("employee{i}"))
                .with(
                    "hired_at",
                    format!("2021-{:02}-{:02}T09:30:00Z", i % 12 + 1, i % 28 + 1),
                )
                .with("department_id", (i % departments).to_string())
                .with("job_id", (i % jobs).to_string())
        })
        .collect()
}

pub fn employees_with_duplicate_id(size: usize, departments: usize, jobs: usize) -> Vec<RawRecord> {
    let mut records = employees(size, departments, jobs);
    records.push(
        RawRecord::new()
            .with("id", "1")
            .with("name", "employee")
            .with("hired_at", "2021-01-01T00:00:00Z")
            .with("department_id", "0")
            .with("job_id", "0"),
    );
    records
}

/// JSON array text of the records, as a misdirected upload would carry.
pub fn to_json_bytes(records: &[RawRecord]) -> Vec<u8> {
    serde_json::to_vec(records).unwrap()
}

pub fn ids(records: &[RawRecord]) -> Vec<i64> {
    let mut ids: Vec<i64> = records
        .iter()
        .map(|record| record.get("id").unwrap().parse().unwrap())
        .collect();
    ids.sort_unstable();
    ids
}
