//! Database connection pool management.
//!
//! This module provides connection pooling for SQLite using r2d2. Every
//! connection gets foreign key enforcement and, when `show_sql` is set, a
//! trace hook that logs each executed statement.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bookstore_common::{DatabaseConfig, DatabaseLocation, Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::from_pool;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Log target for statements traced when `show_sql` is enabled.
pub const SQL_LOG_TARGET: &str = "bookstore_db::sql";

/// Initialize a connection pool for the configured database.
///
/// In-memory databases are opened as uniquely-named shared-cache databases,
/// so all connections of one pool share state while separate pools never
/// see each other. Their connections are never retired, which keeps the
/// database alive until the pool is dropped.
///
/// File databases additionally use WAL journal mode.
///
/// # Example
///
/// ```
/// use bookstore_common::DatabaseConfig;
/// use bookstore_db::pool::{init_pool, get_conn};
///
/// let pool = init_pool(&DatabaseConfig::default()).unwrap();
/// let conn = get_conn(&pool).unwrap();
/// ```
pub fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let location = config.location()?;
    let show_sql = config.show_sql;
    let wal = !location.is_memory();

    let manager = match &location {
        DatabaseLocation::Memory { name } => {
            static COUNTER: AtomicU64 = AtomicU64::new(0);
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            SqliteConnectionManager::file(format!("file:{name}_{n}?mode=memory&cache=shared"))
        }
        DatabaseLocation::File(path) => SqliteConnectionManager::file(path),
    };

    let manager = manager.with_init(move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        if wal {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        if show_sql {
            conn.trace(Some(log_sql));
        }
        Ok(())
    });

    let mut builder = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(config.connection_timeout_secs));
    if location.is_memory() {
        builder = builder.max_lifetime(None).idle_timeout(None);
    }

    let pool = builder
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;

    tracing::info!(
        url = %config.url,
        username = %config.username,
        pool_size = config.pool_size,
        "Connection pool ready"
    );

    Ok(pool)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get().map_err(from_pool)
}

fn log_sql(sql: &str) {
    tracing::info!(target: SQL_LOG_TARGET, "{sql}");
}
