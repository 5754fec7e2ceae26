//! Named data source registry.
//!
//! Problem files refer to databases by name; the registry maps those names
//! to shared [`DataSource`] handles.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::sqlite::SqliteSource;
use crate::error::{DataError, Result};
use crate::infrastructure::config::DatabaseConfig;
use crate::port::DataSource;

/// Dialects with a bundled adapter.
pub const SUPPORTED_DIALECTS: &[&str] = &["sqlite"];

/// Registry of named data sources.
#[derive(Clone, Default)]
pub struct DataSources {
    sources: BTreeMap<String, Arc<dyn DataSource>>,
}

impl DataSources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open one source per database entry.
    ///
    /// # Errors
    ///
    /// Returns a config error for an invalid entry,
    /// [`DataError::UnsupportedDialect`] for a dialect without an adapter,
    /// [`DataError::DuplicateSource`] for a repeated name, and
    /// [`DataError::Connection`] if a pool cannot be opened.
    pub fn from_configs(configs: &[DatabaseConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            config.validate()?;
            let dialect = config.dialect.to_ascii_lowercase();
            if !SUPPORTED_DIALECTS.contains(&dialect.as_str()) {
                return Err(DataError::UnsupportedDialect {
                    dialect: config.dialect.clone(),
                }
                .into());
            }
            let source: Arc<dyn DataSource> = Arc::new(SqliteSource::open(
                config.name.clone(),
                &config.database,
                config.max_connections(),
            )?);
            registry.add(config.name.clone(), source)?;
        }
        Ok(registry)
    }

    /// Register a source under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DuplicateSource`] if the name is taken.
    pub fn add(&mut self, name: impl Into<String>, source: Arc<dyn DataSource>) -> Result<()> {
        let name = name.into();
        if self.sources.contains_key(&name) {
            return Err(DataError::DuplicateSource { name }.into());
        }
        tracing::info!(
            component = "registry",
            operation = "add",
            source = %name,
            "Registered data source"
        );
        self.sources.insert(name, source);
        Ok(())
    }

    /// Look up a source by name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownSource`] if no source has that name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DataSource>> {
        self.sources.get(name).cloned().ok_or_else(|| {
            DataError::UnknownSource {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Drop every registered source.
    ///
    /// Pools close once the last builder holding a handle is dropped too.
    pub fn close_all(&mut self) {
        let closed = self.sources.len();
        self.sources.clear();
        tracing::info!(
            component = "registry",
            operation = "close_all",
            closed,
            "Closed data sources"
        );
    }
}

impl std::fmt::Debug for DataSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.sources.keys()).finish()
    }
}
