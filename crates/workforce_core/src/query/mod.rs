//! Named, read-only analytical queries.
//!
//! # Responsibility
//! - Resolve query assets by name from the embedded set or a directory.
//! - Execute them read-only and return rows as column -> value mappings.
//!
//! # Invariants
//! - Statements that could write are refused before execution.
//! - Row order is exactly the engine's result order.

pub mod catalog;
pub mod runner;

pub use catalog::{QueryAssetError, QueryCatalog, DEPARTMENTS_ABOVE_MEAN_2021, QUARTERLY_HIRES_2021};
pub use runner::{QueryRow, QueryRunner};
