//! Solver backend configuration.

use serde::Deserialize;
use std::time::Duration;

use crate::port::SolveOptions;

/// `[solver]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Backend name, see [`AVAILABLE_SOLVERS`](crate::adapter::outbound::solver::AVAILABLE_SOLVERS).
    pub backend: String,

    /// Wall-clock limit per solve, in seconds.
    pub time_limit_secs: Option<f64>,

    /// Let the backend print its own log.
    pub verbose: bool,
}

impl SolverConfig {
    /// Options for a solve call, with an optional per-call time limit override.
    #[must_use]
    pub fn solve_options(&self, time_limit_secs: Option<f64>) -> SolveOptions {
        SolveOptions {
            time_limit: time_limit_secs
                .or(self.time_limit_secs)
                .map(Duration::from_secs_f64),
            verbose: self.verbose,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: "highs".into(),
            time_limit_secs: None,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_configured_limit() {
        let config = SolverConfig {
            time_limit_secs: Some(60.0),
            ..SolverConfig::default()
        };
        assert_eq!(
            config.solve_options(Some(1.5)).time_limit,
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            config.solve_options(None).time_limit,
            Some(Duration::from_secs(60))
        );
        assert_eq!(SolverConfig::default().solve_options(None).time_limit, None);
    }
}
