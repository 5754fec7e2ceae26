//! SQLite data source using Diesel ORM.
//!
//! Column and aggregate queries run through `diesel::sql_query` on an r2d2
//! connection pool.

pub mod connection;
mod source;

pub use connection::{create_pool, DbPool};
pub use source::SqliteSource;
