//! Storage primitives for the SQLite database
//!
//! r2d2 pooling, per-connection pragmas and the storage error type. Schema
//! and queries belong to the infrastructure crate.

pub mod error;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use sqlite::{apply_connection_pragmas, PoolHealth, SqliteConnection, SqlitePool, SqlitePoolConfig};
