//! Chunked, all-or-nothing ingestion for departments, jobs and employees.
//!
//! # Responsibility
//! - Split input into chunks of at most `batch_size` records.
//! - Construct every record of a chunk before writing any of it.
//! - Flush each chunk into one shared transaction and commit once.
//!
//! # Invariants
//! - A call either commits every record or none.
//! - The returned count is produced only after a successful commit.
//! - The transaction is rolled back on every failing exit path.

use crate::error::{ErrorKind, IngestError, IngestResult};
use crate::logging::{sanitize_message, EventLog, MAX_LOGGED_CAUSE_CHARS};
use crate::model::entity::{Department, Employee, EntityKind, Job};
use crate::model::record::RawRecord;
use crate::normalize::normalize;
use crate::repo::record_repo::{ensure_connection_ready, insert_chunk, StorageRecord};
use crate::service::classify::{classify, IngestFailure};
use log::Level;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

/// Entry point for every ingestion call against one connection.
pub struct IngestService<'conn> {
    conn: &'conn Connection,
    batch_size: NonZeroUsize,
    log: Arc<dyn EventLog>,
}

impl<'conn> IngestService<'conn> {
    /// Creates a service over a migrated connection.
    ///
    /// # Errors
    /// `ConfigurationError` when the connection schema is not the one this
    /// crate writes to.
    pub fn try_new(
        conn: &'conn Connection,
        batch_size: NonZeroUsize,
        log: Arc<dyn EventLog>,
    ) -> IngestResult<Self> {
        ensure_connection_ready(conn).map_err(|err| {
            let error = classify(err.into());
            log.emit(
                Level::Error,
                &format!(
                    "event=ingest_init module=service status=error error_code={} cause={}",
                    error.kind().code(),
                    cause_text(&error)
                ),
            );
            error
        })?;
        Ok(Self {
            conn,
            batch_size,
            log,
        })
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    pub fn ingest_departments_batch(&self, records: &[RawRecord]) -> IngestResult<usize> {
        self.ingest::<Department>(records)
    }

    pub fn ingest_departments_file(&self, bytes: &[u8]) -> IngestResult<usize> {
        self.ingest_file::<Department>(bytes)
    }

    pub fn ingest_jobs_batch(&self, records: &[RawRecord]) -> IngestResult<usize> {
        self.ingest::<Job>(records)
    }

    pub fn ingest_jobs_file(&self, bytes: &[u8]) -> IngestResult<usize> {
        self.ingest_file::<Job>(bytes)
    }

    pub fn ingest_employees_batch(&self, records: &[RawRecord]) -> IngestResult<usize> {
        self.ingest::<Employee>(records)
    }

    pub fn ingest_employees_file(&self, bytes: &[u8]) -> IngestResult<usize> {
        self.ingest_file::<Employee>(bytes)
    }

    /// Structured-batch ingestion with the entity kind chosen at run time.
    pub fn ingest_batch(&self, kind: EntityKind, records: &[RawRecord]) -> IngestResult<usize> {
        match kind {
            EntityKind::Department => self.ingest::<Department>(records),
            EntityKind::Job => self.ingest::<Job>(records),
            EntityKind::Employee => self.ingest::<Employee>(records),
        }
    }

    /// File ingestion with the entity kind chosen at run time.
    pub fn ingest_file_as(&self, kind: EntityKind, bytes: &[u8]) -> IngestResult<usize> {
        match kind {
            EntityKind::Department => self.ingest_file::<Department>(bytes),
            EntityKind::Job => self.ingest_file::<Job>(bytes),
            EntityKind::Employee => self.ingest_file::<Employee>(bytes),
        }
    }

    /// Normalizes a delimited payload, then ingests it like a batch.
    pub fn ingest_file<R: StorageRecord>(&self, bytes: &[u8]) -> IngestResult<usize> {
        let started_at = Instant::now();
        self.emit(
            Level::Info,
            format!(
                "event=ingest_file module=service status=start kind={} bytes={}",
                R::KIND,
                bytes.len()
            ),
        );

        let records = normalize(bytes, R::KIND.columns())
            .map_err(|err| self.fail(R::KIND, "ingest_file", started_at, err.into()))?;
        self.ingest::<R>(&records)
    }

    /// Ingests raw records of one kind in a single transaction.
    ///
    /// # Errors
    /// Any construction, flush, or commit failure rolls the whole call back
    /// and is returned as a classified `IngestError`.
    pub fn ingest<R: StorageRecord>(&self, records: &[RawRecord]) -> IngestResult<usize> {
        let started_at = Instant::now();
        self.emit(
            Level::Info,
            format!(
                "event=ingest_batch module=service status=start kind={} records={} batch_size={}",
                R::KIND,
                records.len(),
                self.batch_size
            ),
        );

        match self.run_pipeline::<R>(records) {
            Ok(inserted) => {
                self.emit(
                    Level::Info,
                    format!(
                        "event=ingest_batch module=service status=ok kind={} inserted={} duration_ms={}",
                        R::KIND,
                        inserted,
                        started_at.elapsed().as_millis()
                    ),
                );
                Ok(inserted)
            }
            Err(failure) => Err(self.fail(R::KIND, "ingest_batch", started_at, failure)),
        }
    }

    fn run_pipeline<R: StorageRecord>(&self, records: &[RawRecord]) -> Result<usize, IngestFailure> {
        let batch_size = self.batch_size.get();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let mut inserted = 0;
        for (chunk_index, chunk) in records.chunks(batch_size).enumerate() {
            let offset = chunk_index * batch_size;
            let typed = chunk
                .iter()
                .enumerate()
                .map(|(position, raw)| {
                    R::from_raw(raw).map_err(|error| IngestFailure::Construct {
                        index: offset + position,
                        error,
                    })
                })
                .collect::<Result<Vec<R>, _>>()?;

            inserted += insert_chunk(&tx, &typed)?;
            self.emit(
                Level::Debug,
                format!(
                    "event=chunk_flush module=service status=ok kind={} chunk={} rows={}",
                    R::KIND,
                    chunk_index,
                    typed.len()
                ),
            );
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn fail(
        &self,
        kind: EntityKind,
        event: &str,
        started_at: Instant,
        failure: IngestFailure,
    ) -> IngestError {
        let error = classify(failure);
        let level = match error.kind() {
            ErrorKind::TransientFailure | ErrorKind::ConfigurationError => Level::Error,
            _ => Level::Warn,
        };
        self.emit(
            level,
            format!(
                "event={} module=service status=error kind={} duration_ms={} error_code={} cause={}",
                event,
                kind,
                started_at.elapsed().as_millis(),
                error.kind().code(),
                cause_text(&error)
            ),
        );
        error
    }

    fn emit(&self, level: Level, message: String) {
        self.log.emit(level, &message);
    }
}

fn cause_text(error: &IngestError) -> String {
    error
        .cause()
        .map(|cause| sanitize_message(&cause.to_string(), MAX_LOGGED_CAUSE_CHARS))
        .unwrap_or_else(|| "none".to_string())
}
