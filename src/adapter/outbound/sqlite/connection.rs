//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling and per-connection pragmas for SQLite
//! databases.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;

use crate::error::{DataError, Result};

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// In-memory databases are private to one connection.
const MEMORY_DATABASE: &str = ":memory:";

/// Milliseconds a connection waits on a locked database.
const BUSY_TIMEOUT_MS: u32 = 5000;

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        diesel::sql_query(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;
        Ok(())
    }
}

/// Create a connection pool for the given database path.
///
/// `:memory:` databases get a single connection so every query sees the
/// same data.
///
/// # Errors
/// Returns [`DataError::Connection`] if the pool cannot be created.
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool> {
    let max_size = if database_url == MEMORY_DATABASE {
        1
    } else {
        max_size.max(1)
    };

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| DataError::Connection(e.to_string()))?;

    tracing::debug!(
        component = "sqlite",
        operation = "create_pool",
        database = database_url,
        max_size,
        "Opened connection pool"
    );
    Ok(pool)
}
