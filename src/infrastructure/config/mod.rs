//! Infrastructure configuration modules.

pub mod database;
pub mod logging;
pub mod settings;
pub mod solver;

pub use database::DatabaseConfig;
pub use logging::LoggingConfig;
pub use settings::Config;
pub use solver::SolverConfig;
