//! Database connection pool management.
//!
//! This module provides connection pooling for SQLite using r2d2.
//! Initialization runs pending migrations and then the `t_video.time` repair,
//! so every pool handed out has the full current schema.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use vidforge_common::{Error, Result};

use crate::{columns, migrations};

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

fn prepare(pool: &DbPool) -> Result<()> {
    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    columns::ensure_video_time_column(&conn)?;

    Ok(())
}

/// Initialize a new database pool with the given file path.
///
/// This function will:
/// - Create the SQLite database file if it doesn't exist
/// - Set up connection pooling with r2d2 (4 connections)
/// - Run pending database migrations
/// - Add `t_video.time` if the database predates it
///
/// # Example
///
/// ```no_run
/// use vidforge_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/vidforge/vidforge.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.busy_timeout(std::time::Duration::from_secs(5)));

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    prepare(&pool)?;

    tracing::debug!(path = db_path, "Database pool ready");
    Ok(pool)
}

/// Initialize an in-memory database pool for testing.
///
/// Every SQLite in-memory connection is its own database, so the pool holds a
/// single connection.
///
/// # Example
///
/// ```
/// use vidforge_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory();

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create in-memory pool: {}", e)))?;

    prepare(&pool)?;

    Ok(pool)
}

/// Open an existing database file without running migrations.
///
/// Used for one-off repairs of databases vidforge didn't create. Fails
/// instead of creating an empty file when the path doesn't exist.
pub fn open_existing(db_path: &str) -> Result<rusqlite::Connection> {
    let conn = rusqlite::Connection::open_with_flags(
        db_path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_URI,
    )
    .map_err(|e| Error::database(format!("Failed to open {}: {}", db_path, e)))?;

    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(conn)
}

/// Get a connection from the pool.
///
/// Convenience wrapper around `pool.get()` that converts the r2d2 error into
/// the common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}
