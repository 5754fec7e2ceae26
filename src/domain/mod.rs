//! Solver-agnostic model types.

mod constraint;
mod data;
mod ids;
mod linear;
mod model;
mod solution;
mod variable;

pub use constraint::{Comparator, Constraint};
pub use data::{DataBinding, DataQuery, DataRow, Series, AGGREGATE_COLUMN};
pub use ids::{RowKey, VariableId};
pub use linear::LinearForm;
pub use model::{Direction, Model, Objective};
pub use solution::{Solution, SolutionStatus};
pub use variable::{Variable, VariableBounds, VariableDomain, VariableSpec};
