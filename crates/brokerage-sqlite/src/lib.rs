//! SQLite-backed projection store for share price movement windows
//!
//! Key features:
//! - One row per window, keyed by the window identity
//! - Append-only price points, ordered by arrival
//! - Filtered reads with bound parameters over whitelisted fields
//! - Idempotent window creation (create-if-absent on identity)
//! - WAL mode for concurrent readers

pub mod query;
pub mod schema;
pub mod store;

pub use store::SqliteMovementStore;
