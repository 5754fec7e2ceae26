//! Solver port for linear and mixed-integer programming.
//!
//! A solver takes a compiled [`Model`] and reports a [`Solution`]. Backend
//! failures are reported through the solution status rather than as an
//! `Err`, so callers always get timing information and a message.

use std::time::Duration;

use crate::domain::{Model, Solution};

/// Per-call solver options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveOptions {
    /// Wall-clock limit; `None` means unlimited.
    pub time_limit: Option<Duration>,

    /// Let the backend print its own progress log.
    pub verbose: bool,
}

impl SolveOptions {
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Linear and mixed-integer programming solver.
///
/// Implementations wrap specific solver backends (HiGHS, CBC, etc.) and
/// translate a [`Model`] into the backend's representation.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Implementation Notes
///
/// - Variables keep their declared bounds and domain
/// - The objective constant is added back to the reported objective value
/// - Infeasible, unbounded, timed-out and failed runs map to the matching
///   [`SolutionStatus`](crate::domain::SolutionStatus)
pub trait Solver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Solve a model.
    fn solve(&self, model: &Model, options: &SolveOptions) -> Solution;
}
