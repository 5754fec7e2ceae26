//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. Every
//! section is optional; a missing file section falls back to its defaults.
//!
//! # Example
//!
//! ```no_run
//! use datasolver::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("datasolver.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::database::DatabaseConfig;
use super::logging::LoggingConfig;
use super::solver::SolverConfig;
use crate::adapter::outbound::solver::AVAILABLE_SOLVERS;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Solver backend selection and limits.
    #[serde(default)]
    pub solver: SolverConfig,

    /// Named databases data bindings can refer to.
    #[serde(default)]
    pub databases: Vec<DatabaseConfig>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        let backend = self.solver.backend.to_ascii_lowercase();
        if !AVAILABLE_SOLVERS.contains(&backend.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "solver.backend",
                reason: format!(
                    "unknown backend '{}', expected one of: {}",
                    self.solver.backend,
                    AVAILABLE_SOLVERS.join(", ")
                ),
            }
            .into());
        }
        if let Some(limit) = self.solver.time_limit_secs {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "solver.time_limit_secs",
                    reason: "must be a positive number of seconds".to_string(),
                }
                .into());
            }
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: "must be 'pretty' or 'json'".to_string(),
            }
            .into());
        }

        let mut names = HashSet::new();
        for database in &self.databases {
            database.validate()?;
            if !names.insert(database.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "databases.name",
                    reason: format!("duplicate database name '{}'", database.name),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Look up a database entry by name.
    #[must_use]
    pub fn database(&self, name: &str) -> Option<&DatabaseConfig> {
        self.databases.iter().find(|db| db.name == name)
    }
}
