//! In-memory data source.
//!
//! Holds tables as ordered [`DataRow`]s. Useful for tests and for problems
//! whose data is already loaded by the caller.

use std::collections::HashMap;

use crate::domain::{DataQuery, DataRow, RowKey};
use crate::error::{DataError, Result};
use crate::port::DataSource;

/// A [`DataSource`] backed by tables held in memory.
///
/// Each row carries its own key. Column queries with a key column report
/// those keys; queries without one key rows by position, like the SQL
/// sources do. Aggregate SQL cannot be evaluated and is rejected.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    tables: HashMap<String, Vec<DataRow>>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: HashMap::new(),
        }
    }

    /// Add or replace a table.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>, rows: Vec<DataRow>) -> Self {
        self.tables.insert(table.into(), rows);
        self
    }

    #[must_use]
    pub fn table(&self, table: &str) -> Option<&[DataRow]> {
        self.tables.get(table).map(Vec::as_slice)
    }
}

impl DataSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, query: &DataQuery) -> Result<Vec<DataRow>> {
        match query {
            DataQuery::Column { table, column, key } => {
                let rows = self.tables.get(table).ok_or_else(|| DataError::UnknownTable {
                    table: table.clone(),
                })?;

                let out = rows
                    .iter()
                    .enumerate()
                    .map(|(position, row)| {
                        let key = match key {
                            Some(_) => row.key.clone(),
                            None => RowKey::new(position.to_string()),
                        };
                        let mut out = DataRow::new(key);
                        if let Some(value) = row.get(column) {
                            out = out.with(column.as_str(), value);
                        }
                        out
                    })
                    .collect();
                Ok(out)
            }
            DataQuery::Aggregate { sql } => Err(DataError::Query(format!(
                "source '{}' cannot evaluate SQL: {sql}",
                self.name
            ))
            .into()),
        }
    }
}
