//! Column and aggregate queries against a pooled SQLite database.
//!
//! Values are read with their storage class so that text and blobs are
//! reported instead of being coerced to numbers.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{BigInt, Double, Nullable, Text};

use super::connection::{create_pool, DbPool};
use crate::domain::{DataQuery, DataRow, RowKey, AGGREGATE_COLUMN};
use crate::error::{DataError, Result};
use crate::port::DataSource;

#[derive(QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Nullable<Text>)]
    row_key: Option<String>,
    #[diesel(sql_type = Text)]
    value_type: String,
    #[diesel(sql_type = Nullable<Double>)]
    value: Option<f64>,
}

#[derive(QueryableByName)]
struct AggregateRow {
    #[diesel(sql_type = Text)]
    value_type: String,
    #[diesel(sql_type = Nullable<Double>)]
    value: Option<f64>,
    #[diesel(sql_type = BigInt)]
    row_count: i64,
}

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// A [`DataSource`] reading from a SQLite database.
#[derive(Clone)]
pub struct SqliteSource {
    name: String,
    pool: DbPool,
}

impl SqliteSource {
    /// Open a pooled source on `database` (a file path or `:memory:`).
    ///
    /// # Errors
    /// Returns [`DataError::Connection`] if the pool cannot be created.
    pub fn open(name: impl Into<String>, database: &str, pool_size: u32) -> Result<Self> {
        Ok(Self::from_pool(name, create_pool(database, pool_size)?))
    }

    pub fn from_pool(name: impl Into<String>, pool: DbPool) -> Self {
        Self {
            name: name.into(),
            pool,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn connection(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        Ok(self
            .pool
            .get()
            .map_err(|e| DataError::Connection(e.to_string()))?)
    }

    fn column(&self, table: &str, column: &str, key: Option<&str>) -> Result<Vec<DataRow>> {
        let mut conn = self.connection()?;

        let exists = diesel::sql_query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
        )
        .bind::<Text, _>(table)
        .get_result::<Count>(&mut conn)
        .map_err(query_error)?;
        if exists.count == 0 {
            return Err(DataError::UnknownTable {
                table: table.to_string(),
            }
            .into());
        }

        for name in std::iter::once(column).chain(key) {
            let found = diesel::sql_query(
                "SELECT COUNT(*) AS count FROM pragma_table_info(?) WHERE name = ?",
            )
            .bind::<Text, _>(table)
            .bind::<Text, _>(name)
            .get_result::<Count>(&mut conn)
            .map_err(query_error)?;
            if found.count == 0 {
                return Err(
                    DataError::Query(format!("no column '{name}' in table '{table}'")).into(),
                );
            }
        }

        let key_expr = key.map_or_else(|| "NULL".to_string(), quote_ident);
        let value_expr = quote_ident(column);
        let sql = format!(
            "SELECT CAST({key_expr} AS TEXT) AS row_key, typeof({value_expr}) AS value_type, \
             CAST({value_expr} AS REAL) AS value FROM {}",
            quote_ident(table)
        );
        tracing::debug!(component = "sqlite", source = %self.name, sql = %sql, "Running column query");

        let rows = diesel::sql_query(&sql)
            .load::<ColumnRow>(&mut conn)
            .map_err(query_error)?;

        rows.into_iter()
            .enumerate()
            .map(|(position, row)| -> Result<DataRow> {
                let key = row.row_key.unwrap_or_else(|| position.to_string());
                check_numeric(&row.value_type, column, &key)?;
                let out = DataRow::new(RowKey::new(key));
                Ok(match row.value {
                    Some(value) => out.with(column, value),
                    None => out,
                })
            })
            .collect()
    }

    fn aggregate(&self, sql: &str) -> Result<Vec<DataRow>> {
        let mut conn = self.connection()?;
        let inner = sql.trim().trim_end_matches(';');
        let wrapped = format!(
            "SELECT typeof(({inner})) AS value_type, CAST(({inner}) AS REAL) AS value, \
             (SELECT COUNT(*) FROM ({inner})) AS row_count"
        );
        tracing::debug!(component = "sqlite", source = %self.name, sql = %wrapped, "Running aggregate query");

        let row = diesel::sql_query(&wrapped)
            .get_result::<AggregateRow>(&mut conn)
            .map_err(query_error)?;
        if row.row_count != 1 {
            return Err(DataError::NotScalar {
                rows: usize::try_from(row.row_count).unwrap_or_default(),
            }
            .into());
        }
        check_numeric(&row.value_type, AGGREGATE_COLUMN, "0")?;

        let out = DataRow::new(RowKey::new("0"));
        Ok(vec![match row.value {
            Some(value) => out.with(AGGREGATE_COLUMN, value),
            None => out,
        }])
    }
}

impl DataSource for SqliteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, query: &DataQuery) -> Result<Vec<DataRow>> {
        match query {
            DataQuery::Column { table, column, key } => {
                self.column(table, column, key.as_deref())
            }
            DataQuery::Aggregate { sql } => self.aggregate(sql),
        }
    }
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("name", &self.name)
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Accept SQLite's `integer`, `real` and `null` storage classes.
fn check_numeric(value_type: &str, column: &str, row: &str) -> Result<()> {
    match value_type {
        "integer" | "real" | "null" => Ok(()),
        found => Err(DataError::NonNumeric {
            column: column.to_string(),
            row: row.to_string(),
            found: found.to_string(),
        }
        .into()),
    }
}

fn query_error(e: diesel::result::Error) -> DataError {
    DataError::Query(e.to_string())
}
