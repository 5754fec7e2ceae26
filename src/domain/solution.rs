//! Solver results.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::ids::VariableId;
use crate::error::SolverError;

/// Termination status of an optimization solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolutionStatus {
    /// Solver found an optimal solution.
    Optimal,

    /// No feasible solution exists.
    Infeasible,

    /// Objective function is unbounded.
    Unbounded,

    /// Solver stopped (time limit or cancellation) without proving optimality.
    NotSolved,

    /// Solver backend could not run.
    Error,
}

/// Result of one solve call. Never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub status: SolutionStatus,

    /// Objective value, present only when optimal.
    pub objective_value: Option<f64>,

    /// Variable assignments; empty unless the backend produced a point.
    pub values: BTreeMap<VariableId, f64>,

    /// Backend message for `Error` and `NotSolved` outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Wall time spent in the backend.
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl Solution {
    /// Optimal solution with its assignment.
    #[must_use]
    pub fn optimal(values: BTreeMap<VariableId, f64>, objective_value: f64) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective_value: Some(objective_value),
            values,
            message: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Non-optimal outcome without values.
    #[must_use]
    pub fn with_status(status: SolutionStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: BTreeMap::new(),
            message: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Backend failure.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(SolutionStatus::Error).with_message(message)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Return `true` if the solver found an optimal solution.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Value assigned to a variable.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<f64> {
        self.values.get(&VariableId::new(id)).copied()
    }

    /// Convert a non-optimal status into a [`SolverError`].
    ///
    /// # Errors
    ///
    /// Returns the error matching the status for every outcome except
    /// `Optimal`.
    pub fn into_result(self) -> Result<Self, SolverError> {
        match self.status {
            SolutionStatus::Optimal => Ok(self),
            SolutionStatus::Infeasible => Err(SolverError::Infeasible),
            SolutionStatus::Unbounded => Err(SolverError::Unbounded),
            SolutionStatus::NotSolved => Err(SolverError::Timeout),
            SolutionStatus::Error => Err(SolverError::Backend(
                self.message.unwrap_or_else(|| "unknown failure".into()),
            )),
        }
    }
}
