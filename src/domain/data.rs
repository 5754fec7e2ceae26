//! Values fetched from data sources.
//!
//! A data source answers a [`DataQuery`] with ordered [`DataRow`]s; the
//! binding resolver turns those rows into a [`DataBinding`] for the
//! identifier the query was declared under.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ids::RowKey;
use crate::error::DataError;

/// What to ask a data source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQuery {
    /// One value per row of `table.column`.
    ///
    /// Rows are keyed by `key` when given, otherwise by their position.
    Column {
        table: String,
        column: String,
        key: Option<String>,
    },
    /// A single value produced by an aggregate SQL expression.
    Aggregate { sql: String },
}

impl DataQuery {
    /// Per-row column query.
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Column {
            table: table.into(),
            column: column.into(),
            key: None,
        }
    }

    /// Per-row column query keyed by `key`.
    pub fn keyed_column(
        table: impl Into<String>,
        column: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::Column {
            table: table.into(),
            column: column.into(),
            key: Some(key.into()),
        }
    }

    /// Aggregate (single value) query.
    pub fn aggregate(sql: impl Into<String>) -> Self {
        Self::Aggregate { sql: sql.into() }
    }

    /// Name of the column holding the value in the returned rows.
    #[must_use]
    pub fn value_column(&self) -> &str {
        match self {
            Self::Column { column, .. } => column,
            Self::Aggregate { .. } => AGGREGATE_COLUMN,
        }
    }
}

/// Column name aggregate queries report their value under.
pub const AGGREGATE_COLUMN: &str = "value";

/// A row returned by a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub key: RowKey,
    pub values: BTreeMap<String, f64>,
}

impl DataRow {
    pub fn new(key: impl Into<RowKey>) -> Self {
        Self {
            key: key.into(),
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: f64) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// Ordered `(row key, value)` pairs of a per-row column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    entries: Vec<(RowKey, f64)>,
}

impl Series {
    pub fn new(entries: Vec<(RowKey, f64)>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn value(&self, row: usize) -> Option<f64> {
        self.entries.get(row).map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }
}

impl FromIterator<(RowKey, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (RowKey, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A resolved value for an identifier that is not a declared variable.
///
/// Cloning is cheap; series data is shared.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBinding {
    /// Shared across every row.
    Scalar(f64),
    /// One value per row.
    Series(Arc<Series>),
}

impl DataBinding {
    /// Per-row binding from `(key, value)` pairs.
    pub fn series<K: Into<RowKey>>(entries: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self::Series(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Build a binding from the rows a data source returned for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotScalar`] when an aggregate query does not
    /// return exactly one row, and [`DataError::MissingValue`] when a row
    /// lacks the value column.
    pub fn from_rows(query: &DataQuery, rows: Vec<DataRow>) -> Result<Self, DataError> {
        let column = query.value_column();
        let value_of = |row: &DataRow| {
            row.get(column).ok_or_else(|| DataError::MissingValue {
                column: column.to_string(),
                row: row.key.to_string(),
            })
        };

        match query {
            DataQuery::Aggregate { .. } => match rows.as_slice() {
                [row] => Ok(Self::Scalar(value_of(row)?)),
                _ => Err(DataError::NotScalar { rows: rows.len() }),
            },
            DataQuery::Column { .. } => {
                let mut entries = Vec::with_capacity(rows.len());
                for row in &rows {
                    entries.push((row.key.clone(), value_of(row)?));
                }
                Ok(Self::Series(Arc::new(Series::new(entries))))
            }
        }
    }

    /// Return the series, if this is a per-row binding.
    #[must_use]
    pub fn as_series(&self) -> Option<&Series> {
        match self {
            Self::Series(series) => Some(series.as_ref()),
            Self::Scalar(_) => None,
        }
    }
}
