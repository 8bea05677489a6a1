//! Repository layer for persisted records.
//!
//! # Responsibility
//! - Keep SQL for inserting and reading records inside the storage boundary.
//! - Describe each entity kind's table shape through `StorageRecord`.
//!
//! # Invariants
//! - Inserts run inside a caller-owned transaction; the repository never
//!   commits or rolls back on its own.
//! - Constraint enforcement is left to SQLite (primary key, unique, foreign
//!   key, CHECK).

pub mod record_repo;
