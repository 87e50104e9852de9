//! SQLite connection pool
//!
//! Provides r2d2-based connection pooling with pragmas applied on every new
//! connection.

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::config::SqlitePoolConfig;
use super::pragmas::apply_connection_pragmas;
use crate::storage::error::{StorageError, StorageResult};

/// Pooled SQLite connection handed out by [`SqlitePool`].
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

/// Snapshot of the pool state reported by health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolHealth {
    pub is_healthy: bool,
    pub connections: u32,
    pub idle_connections: u32,
    pub max_size: u32,
    pub message: Option<String>,
}

/// SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlitePoolConfig,
}

impl SqlitePool {
    /// Create a new connection pool for the database at `path`.
    ///
    /// A test connection is checked out before returning so a bad path fails
    /// here rather than on first use.
    ///
    /// # Errors
    /// Returns an error if the database file can't be opened or the pool
    /// can't be built.
    #[instrument(skip(config), fields(db_path = ?path, pool_size = config.max_size))]
    pub fn new(path: &Path, config: SqlitePoolConfig) -> StorageResult<Self> {
        if config.max_size == 0 {
            return Err(StorageError::InvalidConfig("pool size must be at least 1".into()));
        }

        info!("Creating SQLite connection pool");

        let pool_config = config.clone();
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            apply_connection_pragmas(conn, &pool_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!("Failed to create connection pool: {}", e);
                StorageError::Connection(format!("Failed to create pool: {}", e))
            })?;

        {
            let _conn = pool.get().map_err(|e| {
                warn!("Failed to get test connection: {}", e);
                StorageError::Connection(format!("Failed to get test connection: {}", e))
            })?;
        }

        info!("SQLite pool created successfully with {} connections", config.max_size);

        Ok(Self { pool, config })
    }

    /// Check out a connection from the pool.
    pub fn get_connection(&self) -> StorageResult<SqliteConnection> {
        let start = std::time::Instant::now();

        match self.pool.get() {
            Ok(conn) => {
                debug!("Connection acquired in {}ms", start.elapsed().as_millis());
                Ok(conn)
            }
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("timed out") || err_str.contains("timeout") {
                    warn!("Connection timeout after {:?}", self.config.connection_timeout);
                    Err(StorageError::Timeout(self.config.connection_timeout.as_secs()))
                } else {
                    warn!("Connection error: {}", e);
                    Err(StorageError::Connection(format!("Failed to get connection: {}", e)))
                }
            }
        }
    }

    /// Report pool utilisation and whether a connection can be acquired.
    pub fn health_check(&self) -> PoolHealth {
        let state = self.pool.state();
        let message = match self.pool.get() {
            Ok(conn) => conn
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .err()
                .map(|e| format!("Probe query failed: {}", e)),
            Err(e) => Some(format!("Pool unhealthy: {}", e)),
        };

        PoolHealth {
            is_healthy: message.is_none(),
            connections: state.connections,
            idle_connections: state.idle_connections,
            max_size: self.config.max_size,
            message,
        }
    }

    pub fn max_size(&self) -> u32 {
        self.config.max_size
    }
}
