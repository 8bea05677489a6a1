//! Ingestion use-case services.
//!
//! # Responsibility
//! - Run the chunked, single-transaction ingestion pipeline for every entity kind.
//! - Map every internal failure onto the caller-facing taxonomy.
//!
//! # Invariants
//! - One transaction per ingestion call, committed once or rolled back fully.
//! - Only `IngestError` crosses the service boundary.

pub mod classify;
pub mod ingest_service;
