//! Handler for `datasolver solve`.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::SolveArgs;
use super::{diagnostic, load_config, output};
use crate::adapter::outbound::registry::DataSources;
use crate::adapter::outbound::solver::{solver_for, AVAILABLE_SOLVERS};
use crate::domain::{Model, Solution, SolutionStatus};
use crate::error::Error;
use crate::problem::ProblemFile;

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Variable")]
    variable: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Compile the problem, solve it and print the solution.
///
/// # Errors
///
/// Returns a report for configuration, data and compile failures, and for
/// any solver status other than optimal (after printing it).
pub fn execute(args: &SolveArgs) -> miette::Result<()> {
    let (config, _) = load_config(args.config.config.as_deref())?;

    let content = diagnostic::read_source(&args.problem)?;
    let problem = ProblemFile::parse_toml(&content)
        .map_err(|e| diagnostic::report_in_file(e, &args.problem, &content))?;

    let mut sources = DataSources::from_configs(&config.databases).map_err(diagnostic::report)?;
    let model = problem.compile(&sources).map_err(diagnostic::report)?;
    sources.close_all();

    let solver = solver_for(&config.solver.backend).ok_or_else(|| {
        miette::Report::new(
            diagnostic::PlainError::new(format!(
                "unknown solver backend '{}'",
                config.solver.backend
            ))
            .with_help(format!("available: {}", AVAILABLE_SOLVERS.join(", "))),
        )
    })?;
    let options = config.solver.solve_options(args.time_limit);
    let solution = solver.solve(&model, &options);

    if output::is_json() {
        output::json_output(&json!({
            "command": "solve",
            "problem": args.problem.display().to_string(),
            "solver": solver.name(),
            "model": model_summary(&model),
            "solution": solution,
        }));
    } else {
        print_solution(&model, &solution, solver.name());
    }

    solution
        .into_result()
        .map(|_| ())
        .map_err(|e| diagnostic::report(Error::Solver(e)))
}

pub(super) fn model_summary(model: &Model) -> serde_json::Value {
    let integers = model
        .variables()
        .iter()
        .filter(|v| v.domain.is_integer())
        .count();
    json!({
        "variables": model.variables().len(),
        "integer_variables": integers,
        "constraints": model.constraints().len(),
        "direction": model.objective().direction,
    })
}

fn print_solution(model: &Model, solution: &Solution, solver: &str) {
    output::header(env!("CARGO_PKG_VERSION"));

    output::section("Model");
    output::field("Variables", model.variables().len());
    output::field("Constraints", model.constraints().len());
    output::field("Solver", solver);

    output::section("Result");
    let ok = solution.is_optimal();
    output::field("Status", output::status(status_label(solution.status), ok));
    if let Some(value) = solution.objective_value {
        output::field("Objective", output::highlight(output::number(value)));
    }
    output::field("Time", format!("{:.3}s", solution.elapsed.as_secs_f64()));
    if let Some(message) = &solution.message {
        output::warning(message);
    }

    if solution.values.is_empty() {
        return;
    }

    // Declaration order, not the map's sort order.
    let rows: Vec<ValueRow> = model
        .variables()
        .iter()
        .filter_map(|v| {
            solution.values.get(&v.id).map(|value| ValueRow {
                variable: v.id.to_string(),
                value: output::number(*value),
            })
        })
        .collect();

    output::section("Values");
    output::lines(&Table::new(rows).to_string());
}

fn status_label(status: SolutionStatus) -> &'static str {
    match status {
        SolutionStatus::Optimal => "optimal",
        SolutionStatus::Infeasible => "infeasible",
        SolutionStatus::Unbounded => "unbounded",
        SolutionStatus::NotSolved => "not solved",
        SolutionStatus::Error => "error",
    }
}
