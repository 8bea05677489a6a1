//! Record shapes flowing through the ingestion pipeline.
//!
//! # Responsibility
//! - Define the raw field mapping produced by normalization or batch callers.
//! - Define typed, storage-ready records for each entity kind.
//!
//! # Invariants
//! - Constructors are pure: no storage access, no logging.
//! - Uniqueness and referential rules are left to storage at commit time.

pub mod entity;
pub mod record;
