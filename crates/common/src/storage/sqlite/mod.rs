//! r2d2-backed SQLite connection pool.

pub mod config;
pub mod pool;
pub mod pragmas;

pub use config::SqlitePoolConfig;
pub use pool::{PoolHealth, SqliteConnection, SqlitePool};
pub use pragmas::apply_connection_pragmas;
