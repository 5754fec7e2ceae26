//! Solver backends.

mod highs;

pub use highs::HighsSolver;

use crate::port::Solver;

/// Names accepted by [`solver_for`].
pub const AVAILABLE_SOLVERS: &[&str] = &["highs"];

/// Look up a solver backend by its configured name.
#[must_use]
pub fn solver_for(name: &str) -> Option<Box<dyn Solver>> {
    match name.to_ascii_lowercase().as_str() {
        "highs" => Some(Box::new(HighsSolver::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_lookup_is_case_insensitive() {
        assert_eq!(solver_for("HiGHS").map(|s| s.name()), Some("highs"));
        assert!(solver_for("gurobi").is_none());
    }
}
