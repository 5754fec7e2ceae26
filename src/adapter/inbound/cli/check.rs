//! Handler for `datasolver check`.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::CheckArgs;
use super::solve::model_summary;
use super::{diagnostic, load_config, output};
use crate::adapter::outbound::registry::DataSources;
use crate::domain::{Direction, Model};
use crate::problem::ProblemFile;

#[derive(Tabled)]
struct ConstraintRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Constraint")]
    body: String,
}

/// Compile a problem without solving and print what it produced.
///
/// # Errors
///
/// Returns a report for configuration, data and compile failures.
pub fn execute(args: &CheckArgs) -> miette::Result<()> {
    let (config, _) = load_config(args.config.config.as_deref())?;

    let content = diagnostic::read_source(&args.problem)?;
    let problem = ProblemFile::parse_toml(&content)
        .map_err(|e| diagnostic::report_in_file(e, &args.problem, &content))?;

    let mut sources = DataSources::from_configs(&config.databases).map_err(diagnostic::report)?;
    let model = problem.compile(&sources).map_err(diagnostic::report)?;
    sources.close_all();

    if output::is_json() {
        let constraints: Vec<_> = model
            .constraints()
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "lhs": c.lhs.to_string(),
                    "comparator": c.comparator.symbol(),
                    "rhs": c.rhs,
                })
            })
            .collect();
        output::json_output(&json!({
            "command": "check",
            "problem": args.problem.display().to_string(),
            "valid": true,
            "model": model_summary(&model),
            "objective": model.objective().form.to_string(),
            "constraints": constraints,
        }));
        return Ok(());
    }

    print_model(&model);
    Ok(())
}

fn print_model(model: &Model) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Model");
    output::success("Problem compiles");

    let integers = model
        .variables()
        .iter()
        .filter(|v| v.domain.is_integer())
        .count();
    output::field("Variables", model.variables().len());
    if integers > 0 {
        output::field("Integer", integers);
    }
    output::field("Constraints", model.constraints().len());

    let objective = model.objective();
    let direction = match objective.direction {
        Direction::Minimize => "minimize",
        Direction::Maximize => "maximize",
    };
    output::field(
        "Objective",
        format!("{direction} {}", output::highlight(&objective.form)),
    );

    let trivial = model.constraints().iter().filter(|c| c.is_trivial()).count();
    if trivial > 0 {
        output::warning(&format!(
            "{trivial} constraint(s) have no variables and are decided by their constants"
        ));
    }

    if model.constraints().is_empty() {
        return;
    }

    let rows: Vec<ConstraintRow> = model
        .constraints()
        .iter()
        .map(|c| ConstraintRow {
            name: c.name.clone(),
            body: format!("{} {} {}", c.lhs, c.comparator, output::number(c.rhs)),
        })
        .collect();
    output::section("Constraints");
    output::lines(&Table::new(rows).to_string());
}
