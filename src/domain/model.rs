//! Frozen optimization model handed to solvers.

use serde::{Deserialize, Serialize};

use super::constraint::Constraint;
use super::ids::VariableId;
use super::linear::LinearForm;
use super::variable::Variable;

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Objective function of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub direction: Direction,
    /// The constant term is kept and included in the reported objective value.
    pub form: LinearForm,
    pub source: String,
}

/// An immutable LP/MILP model description.
///
/// Variables keep declaration order so solver calls are deterministic.
/// Produced by [`ModelBuilder::build`](crate::compiler::ModelBuilder::build).
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    variables: Vec<Variable>,
    objective: Objective,
    constraints: Vec<Constraint>,
}

impl Model {
    pub(crate) fn new(
        variables: Vec<Variable>,
        objective: Objective,
        constraints: Vec<Constraint>,
    ) -> Self {
        Self {
            variables,
            objective,
            constraints,
        }
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Look up a variable by identifier.
    #[must_use]
    pub fn variable(&self, id: &VariableId) -> Option<&Variable> {
        self.variables.iter().find(|v| &v.id == id)
    }

    /// Position of a variable in declaration order.
    #[must_use]
    pub fn variable_index(&self, id: &VariableId) -> Option<usize> {
        self.variables.iter().position(|v| &v.id == id)
    }

    /// Return `true` if any variable requires integrality.
    #[must_use]
    pub fn is_mixed_integer(&self) -> bool {
        self.variables.iter().any(|v| v.domain.is_integer())
    }
}
