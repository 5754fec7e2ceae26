//! Data source port.
//!
//! A data source resolves the queries behind data bindings. The model
//! builder calls it at most once per binding, the first time an expression
//! uses the bound identifier.

use crate::domain::{DataQuery, DataRow};
use crate::error::Result;

/// Read-only access to tabular data.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) so one source can be
/// shared by builders running on different threads.
pub trait DataSource: Send + Sync {
    /// Return the source name for logging and registry lookups.
    fn name(&self) -> &str;

    /// Run a query and return its rows in source order.
    ///
    /// Column queries return one row per table row, keyed by the key column
    /// or by position. Aggregate queries return a single row holding its
    /// value under [`AGGREGATE_COLUMN`](crate::domain::AGGREGATE_COLUMN).
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`](crate::error::DataError) when the table is
    /// unknown, the connection fails, or the query is rejected.
    fn query(&self, query: &DataQuery) -> Result<Vec<DataRow>>;
}
