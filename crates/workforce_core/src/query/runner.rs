//! Read-only execution of named queries.

use super::catalog::{QueryAssetError, QueryCatalog};
use crate::error::IngestResult;
use crate::logging::{sanitize_message, EventLog, MAX_LOGGED_CAUSE_CHARS};
use crate::service::classify::{classify, IngestFailure};
use log::Level;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Number, Value};
use std::sync::Arc;
use std::time::Instant;

/// One result row, columns in select-list order.
pub type QueryRow = Map<String, Value>;

pub struct QueryRunner<'conn> {
    conn: &'conn Connection,
    catalog: QueryCatalog,
    log: Arc<dyn EventLog>,
}

impl<'conn> QueryRunner<'conn> {
    pub fn new(conn: &'conn Connection, catalog: QueryCatalog, log: Arc<dyn EventLog>) -> Self {
        Self { conn, catalog, log }
    }

    /// Runs the named query and returns its rows in engine order.
    ///
    /// # Errors
    /// - `ConfigurationError` when the asset is unknown, unreadable, or not read-only.
    /// - Execution failures are classified like ingestion storage failures.
    pub fn run(&self, query_name: &str) -> IngestResult<Vec<QueryRow>> {
        let started_at = Instant::now();
        self.log.emit(
            Level::Info,
            &format!("event=query_run module=query status=start query={query_name}"),
        );

        match self.execute(query_name) {
            Ok(rows) => {
                self.log.emit(
                    Level::Info,
                    &format!(
                        "event=query_run module=query status=ok query={} rows={} duration_ms={}",
                        query_name,
                        rows.len(),
                        started_at.elapsed().as_millis()
                    ),
                );
                Ok(rows)
            }
            Err(failure) => {
                let detail = sanitize_message(&failure.to_string(), MAX_LOGGED_CAUSE_CHARS);
                let error = classify(failure);
                self.log.emit(
                    Level::Error,
                    &format!(
                        "event=query_run module=query status=error query={} duration_ms={} error_code={} cause={}",
                        query_name,
                        started_at.elapsed().as_millis(),
                        error.kind().code(),
                        detail
                    ),
                );
                Err(error)
            }
        }
    }

    fn execute(&self, query_name: &str) -> Result<Vec<QueryRow>, IngestFailure> {
        let sql = self.catalog.load(query_name)?;
        let mut stmt = self.conn.prepare(sql.trim())?;
        if !stmt.readonly() {
            return Err(QueryAssetError::NotReadOnly(query_name.to_string()).into());
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query([])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut mapped = QueryRow::new();
            for (index, column) in columns.iter().enumerate() {
                mapped.insert(column.clone(), to_json(row.get_ref(index)?));
            }
            results.push(mapped);
        }
        Ok(results)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => Value::Number(number.into()),
        ValueRef::Real(number) => Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::{to_json, QueryRunner};
    use crate::db::open_db_in_memory;
    use crate::error::ErrorKind;
    use crate::logging::{MemoryLog, MAX_LOGGED_CAUSE_CHARS};
    use crate::query::QueryCatalog;
    use rusqlite::types::ValueRef;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[test]
    fn failure_cause_is_capped_in_the_log() {
        let conn = open_db_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let table = "t".repeat(MAX_LOGGED_CAUSE_CHARS * 2);
        std::fs::write(
            dir.path().join("wide_report.sql"),
            format!("SELECT * FROM {table};"),
        )
        .unwrap();
        let log = Arc::new(MemoryLog::new());
        let runner = QueryRunner::new(&conn, QueryCatalog::with_dir(dir.path()), log.clone());

        let err = runner.run("wide_report").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientFailure);

        let (_, message) = log.events().pop().unwrap();
        let cause = message.split("cause=").nth(1).unwrap();
        assert!(cause.ends_with("..."));
        assert_eq!(cause.chars().count(), MAX_LOGGED_CAUSE_CHARS + 3);
    }

    #[test]
    fn sqlite_values_map_to_json() {
        assert_eq!(to_json(ValueRef::Null), Value::Null);
        assert_eq!(to_json(ValueRef::Integer(3)), json!(3));
        assert_eq!(to_json(ValueRef::Real(1.5)), json!(1.5));
        assert_eq!(to_json(ValueRef::Real(f64::NAN)), Value::Null);
        assert_eq!(to_json(ValueRef::Text(b"Ops")), json!("Ops"));
        assert_eq!(to_json(ValueRef::Blob(&[1, 2])), json!([1, 2]));
    }
}
