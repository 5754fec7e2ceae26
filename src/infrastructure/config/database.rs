//! Named database connection settings.

use serde::Deserialize;

use crate::error::ConfigError;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 50;

/// One `[[databases]]` entry.
///
/// The registry opens one pool per entry. Only the `sqlite` dialect has an
/// adapter; other dialects parse but are rejected when the pool is opened.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseConfig {
    /// Name problem files use to refer to this database.
    pub name: String,

    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// File path, or `:memory:`.
    pub database: String,

    /// Connections kept open.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Extra connections allowed under load.
    #[serde(default)]
    pub max_overflow: u32,
}

fn default_dialect() -> String {
    "sqlite".to_string()
}

const fn default_pool_size() -> u32 {
    5
}

impl DatabaseConfig {
    pub fn sqlite(name: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dialect: default_dialect(),
            database: database.into(),
            pool_size: default_pool_size(),
            max_overflow: 0,
        }
    }

    /// Upper bound on open connections.
    #[must_use]
    pub fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow)
    }

    /// Validate field values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a name outside 3..=50
    /// characters or a zero pool size, and [`ConfigError::MissingField`] for
    /// an empty database path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.name.chars().count();
        if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
            return Err(ConfigError::InvalidValue {
                field: "databases.name",
                reason: format!(
                    "'{}' must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters",
                    self.name
                ),
            });
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "databases.database",
            });
        }
        if self.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "databases.pool_size",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config: DatabaseConfig = toml::from_str(
            r#"
            name = "vendas"
            database = "vendas.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, "sqlite");
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.max_connections(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn name_length_is_checked() {
        assert!(DatabaseConfig::sqlite("db", "x.db").validate().is_err());
        assert!(DatabaseConfig::sqlite("abc", "x.db").validate().is_ok());
        assert!(DatabaseConfig::sqlite("a".repeat(51), "x.db").validate().is_err());
        assert!(DatabaseConfig::sqlite("a".repeat(50), "x.db").validate().is_ok());
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let mut config = DatabaseConfig::sqlite("vendas", "x.db");
        config.pool_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "databases.pool_size",
                ..
            })
        ));
    }

    #[test]
    fn overflow_adds_connections() {
        let mut config = DatabaseConfig::sqlite("vendas", "x.db");
        config.max_overflow = 3;
        assert_eq!(config.max_connections(), 8);
    }
}
