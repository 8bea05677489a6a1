//! Delimited-text normalization into raw records.
//!
//! # Responsibility
//! - Decode uploaded file bytes and parse them into ordered raw mappings.
//! - Repair headerless payloads using the caller's expected column list.
//! - Write raw mappings back out as headerless delimited rows.
//!
//! # Invariants
//! - Output preserves input row order and is fully materialized.
//! - Extra fields beyond the header are dropped; missing trailing fields are
//!   absent from the mapping.

mod delimited;

pub use delimited::{normalize, to_delimited_bytes, write_delimited, NormalizeError, DELIMITER};
