//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use super::{load_config, output};

/// Execute `config validate`.
///
/// # Errors
///
/// Returns a report pointing into the file if it does not parse or
/// validate.
pub fn execute_validate(path: Option<&Path>) -> miette::Result<()> {
    let (config, path) = load_config(path)?;
    let source = path.as_ref().map_or_else(
        || "built-in defaults".to_string(),
        |p| p.display().to_string(),
    );

    if output::is_json() {
        let databases: Vec<_> = config
            .databases
            .iter()
            .map(|db| {
                json!({
                    "name": db.name,
                    "dialect": db.dialect,
                    "database": db.database,
                    "pool_size": db.pool_size,
                })
            })
            .collect();
        output::json_output(&json!({
            "command": "config.validate",
            "valid": true,
            "source": source,
            "solver": config.solver.backend,
            "time_limit_secs": config.solver.time_limit_secs,
            "log_level": config.logging.effective_level(),
            "databases": databases,
        }));
        return Ok(());
    }

    output::section("Configuration");
    output::success("Configuration is valid");
    output::field("Source", source);
    output::field("Log level", config.logging.effective_level());
    output::field("Solver", output::highlight(&config.solver.backend));
    if let Some(limit) = config.solver.time_limit_secs {
        output::field("Time limit", format!("{limit}s"));
    }

    output::section("Databases");
    if config.databases.is_empty() {
        output::note("(none configured)");
    }
    for db in &config.databases {
        output::field(&db.name, format!("{} {}", db.dialect, db.database));
    }
    Ok(())
}
