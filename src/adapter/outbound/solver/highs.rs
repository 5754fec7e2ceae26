//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is a high-performance open-source linear/mixed-integer programming solver.
//! This implementation wraps it using the good_lp crate for ergonomic Rust usage.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution as _, SolverModel,
    SolutionStatus as LpStatus, Variable as LpVariable,
};

use crate::domain::{
    Comparator, Direction, LinearForm, Model, Solution, SolutionStatus, VariableId,
};
use crate::port::{SolveOptions, Solver};

/// Slack allowed when checking constraints that have no variable terms.
const TRIVIAL_TOLERANCE: f64 = 1e-9;

/// HiGHS-based LP/MILP solver.
#[derive(Debug, Default, Clone)]
pub struct HighsSolver;

impl HighsSolver {
    /// Create a new HiGHS solver instance.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, model: &Model, options: &SolveOptions) -> Solution {
        let started = Instant::now();
        let solution = solve_with_good_lp(model, options, started);
        let solution = solution.with_elapsed(started.elapsed());

        tracing::info!(
            component = "solver",
            solver = self.name(),
            status = ?solution.status,
            objective = ?solution.objective_value,
            elapsed_ms = solution.elapsed.as_millis() as u64,
            "Solve finished"
        );
        solution
    }
}

/// Internal solver implementation using good_lp.
fn solve_with_good_lp(model: &Model, options: &SolveOptions, started: Instant) -> Solution {
    // Constraints without variables are decided here; HiGHS never sees them.
    for c in model.constraints().iter().filter(|c| c.is_trivial()) {
        if !c.comparator.holds(0.0, c.rhs, TRIVIAL_TOLERANCE) {
            tracing::debug!(component = "solver", constraint = %c, "Trivial constraint violated");
            return Solution::with_status(SolutionStatus::Infeasible)
                .with_message(format!("constraint {} can never hold", c.name));
        }
    }

    // Create variables
    let mut vars = variables!();
    let mut var_map: HashMap<&VariableId, LpVariable> =
        HashMap::with_capacity(model.variables().len());

    for var in model.variables() {
        let mut v = variable();
        if let Some(lb) = var.bounds.lower {
            v = v.min(lb);
        }
        if let Some(ub) = var.bounds.upper {
            v = v.max(ub);
        }
        if var.domain.is_integer() {
            v = v.integer();
        }
        var_map.insert(&var.id, vars.add(v));
    }

    let objective = to_expression(&model.objective().form, &var_map);
    let problem = match model.objective().direction {
        Direction::Minimize => vars.minimise(objective),
        Direction::Maximize => vars.maximise(objective),
    };

    let mut lp = problem.using(highs);
    lp.set_verbose(options.verbose);
    if let Some(limit) = options.time_limit {
        lp = lp.set_time_limit(limit.as_secs_f64());
    }

    // Add constraints
    for c in model.constraints().iter().filter(|c| !c.is_trivial()) {
        let lhs = to_expression(&c.lhs, &var_map);
        let rhs = c.rhs;
        lp = match c.comparator {
            Comparator::GreaterEqual => lp.with(constraint!(lhs >= rhs)),
            Comparator::LessEqual => lp.with(constraint!(lhs <= rhs)),
            Comparator::Equal => lp.with(constraint!(lhs == rhs)),
        };
    }

    let timed_out = || {
        options
            .time_limit
            .is_some_and(|limit| started.elapsed() >= limit)
    };

    match lp.solve() {
        Ok(solved) => {
            let values: BTreeMap<VariableId, f64> = model
                .variables()
                .iter()
                .filter_map(|var| {
                    var_map
                        .get(&var.id)
                        .map(|v| (var.id.clone(), solved.value(*v)))
                })
                .collect();

            // Re-evaluate objective with the solved values
            let objective_value = model.objective().form.evaluate(&values);

            if matches!(solved.status(), LpStatus::TimeLimit) || timed_out() {
                let mut solution = Solution::with_status(SolutionStatus::NotSolved)
                    .with_message("time limit reached before optimality was proven");
                solution.values = values;
                solution
            } else {
                Solution::optimal(values, objective_value)
            }
        }
        Err(ResolutionError::Infeasible) => Solution::with_status(SolutionStatus::Infeasible),
        Err(ResolutionError::Unbounded) => Solution::with_status(SolutionStatus::Unbounded),
        Err(e) if timed_out() => {
            Solution::with_status(SolutionStatus::NotSolved).with_message(e.to_string())
        }
        Err(e) => {
            tracing::warn!(component = "solver", error = %e, "HiGHS failed");
            Solution::error(e.to_string())
        }
    }
}

fn to_expression(form: &LinearForm, vars: &HashMap<&VariableId, LpVariable>) -> Expression {
    let mut expr = Expression::from_other_affine(form.constant_term());
    for (id, c) in form.terms() {
        if let Some(v) = vars.get(id) {
            expr += c * *v;
        }
    }
    expr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ModelBuilder;
    use crate::domain::{DataBinding, VariableDomain, VariableSpec};
    use crate::error::SolverError;
    use std::time::Duration;

    fn solve(builder: &ModelBuilder) -> Solution {
        HighsSolver::new().solve(&builder.build().unwrap(), &SolveOptions::default())
    }

    #[test]
    fn test_solver_name() {
        let solver = HighsSolver::new();
        assert_eq!(solver.name(), "highs");
    }

    #[test]
    fn test_lower_bound_minimum() {
        // Minimize: x
        // Subject to: x >= 5
        let mut builder = ModelBuilder::new();
        builder.declare_variable(VariableSpec::new("x")).unwrap();
        builder.set_objective(Direction::Minimize, "x").unwrap();
        builder.add_constraint("x >= 5").unwrap();

        let solution = solve(&builder);
        assert!(solution.is_optimal());
        assert!((solution.value("x").unwrap() - 5.0).abs() < 1e-6);
        assert!((solution.objective_value.unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_maximize_with_objective_constant() {
        // Maximize: x + y + 10
        // Subject to: x + y <= 4
        let mut builder = ModelBuilder::new();
        builder.declare_variable(VariableSpec::new("x")).unwrap();
        builder.declare_variable(VariableSpec::new("y")).unwrap();
        builder.set_objective(Direction::Maximize, "x + y + 10").unwrap();
        builder.add_constraint("x + y <= 4").unwrap();

        let solution = solve(&builder);
        assert!(solution.is_optimal());
        assert!((solution.objective_value.unwrap() - 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_equality_constraint() {
        // Minimize: x
        // Subject to: x + y = 2
        let mut builder = ModelBuilder::new();
        builder.declare_variable(VariableSpec::new("x")).unwrap();
        builder.declare_variable(VariableSpec::new("y")).unwrap();
        builder.set_objective(Direction::Minimize, "x").unwrap();
        builder.add_constraint("x + y = 2").unwrap();

        let solution = solve(&builder);
        assert!(solution.is_optimal());
        assert!(solution.value("x").unwrap().abs() < 1e-6);
        assert!((solution.value("y").unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible() {
        let mut builder = ModelBuilder::new();
        builder
            .declare_variable(VariableSpec::new("x").upper(1.0))
            .unwrap();
        builder.set_objective(Direction::Minimize, "x").unwrap();
        builder.add_constraint("x >= 2").unwrap();

        let solution = solve(&builder);
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.objective_value.is_none());
        assert_eq!(solution.into_result().unwrap_err(), SolverError::Timeout);
    }

    #[test]
    fn test_unbounded() {
        let mut builder = ModelBuilder::new();
        builder.declare_variable(VariableSpec::new("x")).unwrap();
        builder.set_objective(Direction::Maximize, "x").unwrap();
        builder.add_constraint("x >= 1").unwrap();

        let solution = solve(&builder);
        assert!(matches!(
            solution.status,
            SolutionStatus::Unbounded | SolutionStatus::Infeasible
        ));
        assert!(!solution.is_optimal());
    }

    #[test]
    fn test_integer_rounding() {
        // Maximize: x
        // Subject to: 2 x <= 7, x integer
        let mut builder = ModelBuilder::new();
        builder
            .declare_variable(VariableSpec::new("x").domain(VariableDomain::Integer))
            .unwrap();
        builder.set_objective(Direction::Maximize, "x").unwrap();
        builder.add_constraint("2 * x <= 7").unwrap();

        let solution = solve(&builder);
        assert!(solution.is_optimal());
        assert!((solution.value("x").unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_binary_choice() {
        // Maximize: 3 a + 2 b
        // Subject to: a + b <= 1
        let mut builder = ModelBuilder::new();
        for name in ["a", "b"] {
            builder
                .declare_variable(VariableSpec::new(name).domain(VariableDomain::Binary))
                .unwrap();
        }
        builder.set_objective(Direction::Maximize, "3 * a + 2 * b").unwrap();
        builder.add_constraint("a + b <= 1").unwrap();

        let solution = solve(&builder);
        assert!(solution.is_optimal());
        assert!((solution.value("a").unwrap() - 1.0).abs() < 1e-6);
        assert!(solution.value("b").unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_per_row_constraints() {
        let mut builder = ModelBuilder::new();
        builder.declare_variable(VariableSpec::new("estoque")).unwrap();
        builder
            .bind_value(
                "previsao_venda",
                DataBinding::series([("a", 3.0), ("b", 8.0), ("c", 5.0)]),
            )
            .unwrap();
        builder.set_objective(Direction::Minimize, "estoque").unwrap();
        builder.add_constraint("estoque >= previsao_venda").unwrap();

        let solution = solve(&builder);
        assert!(solution.is_optimal());
        assert!((solution.value("estoque").unwrap() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_violated_trivial_constraint_is_infeasible() {
        let mut builder = ModelBuilder::new();
        builder.declare_variable(VariableSpec::new("x")).unwrap();
        builder.set_objective(Direction::Minimize, "x").unwrap();
        builder.add_constraint("1 >= 2").unwrap();

        let solution = solve(&builder);
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.message.unwrap().contains("c0"));
    }

    #[test]
    fn test_satisfied_trivial_constraint_is_ignored() {
        let mut builder = ModelBuilder::new();
        builder.declare_variable(VariableSpec::new("x")).unwrap();
        builder.set_objective(Direction::Minimize, "x").unwrap();
        builder.add_constraint("2 >= 1").unwrap();

        assert!(solve(&builder).is_optimal());
    }

    #[test]
    fn test_exhausted_time_limit_is_not_solved() {
        // 60-item knapsack with one capacity row
        let mut builder = ModelBuilder::new();
        let mut value = Vec::new();
        let mut weight = Vec::new();
        for i in 0..60 {
            let name = format!("item{i}");
            builder
                .declare_variable(VariableSpec::new(name.as_str()).domain(VariableDomain::Binary))
                .unwrap();
            let w = 1000 + (i * 7919) % 997;
            value.push(format!("{} * {name}", w + (i * 104_729) % 53));
            weight.push(format!("{w} * {name}"));
        }
        builder
            .set_objective(Direction::Maximize, &value.join(" + "))
            .unwrap();
        builder
            .add_constraint(&format!("{} <= 30017", weight.join(" + ")))
            .unwrap();

        let options = SolveOptions::default().with_time_limit(Duration::from_micros(1));
        let solution = HighsSolver::new().solve(&builder.build().unwrap(), &options);
        assert_eq!(solution.status, SolutionStatus::NotSolved);
        assert!(!solution.is_optimal());
        assert!(solution.objective_value.is_none());
    }

    #[test]
    fn test_generous_time_limit_still_optimal() {
        let mut builder = ModelBuilder::new();
        builder.declare_variable(VariableSpec::new("x")).unwrap();
        builder.set_objective(Direction::Minimize, "x").unwrap();
        builder.add_constraint("x >= 1").unwrap();

        let options = SolveOptions::default().with_time_limit(Duration::from_secs(30));
        let solution = HighsSolver::new().solve(&builder.build().unwrap(), &options);
        assert!(solution.is_optimal());
        assert!(solution.elapsed < Duration::from_secs(30));
    }
}
