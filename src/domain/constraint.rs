//! Linear constraint types.
//!
//! A constraint is always stored normalized: every variable on the left, a
//! pure constant on the right.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::linear::LinearForm;

/// Constraint sense (comparison operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// Less than or equal (<=).
    LessEqual,
    /// Greater than or equal (>=).
    GreaterEqual,
    /// Equal (=).
    Equal,
}

impl Comparator {
    /// Operator text as written in expressions.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "=",
        }
    }

    /// Return `true` if `lhs ⋈ rhs` holds within `tolerance`.
    #[must_use]
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Self::LessEqual => lhs <= rhs + tolerance,
            Self::GreaterEqual => lhs + tolerance >= rhs,
            Self::Equal => (lhs - rhs).abs() <= tolerance,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single linear constraint: `lhs {<=, >=, =} rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Generated name, `c{n}` or `c{n}[row_key]` for per-row expansions.
    pub name: String,
    /// Variable terms; the constant is always zero.
    pub lhs: LinearForm,
    pub comparator: Comparator,
    /// Right-hand side value.
    pub rhs: f64,
    /// Expression text the constraint was compiled from.
    pub source: String,
}

impl Constraint {
    /// Return `true` if no variable appears on the left.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.lhs.is_constant()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {} {}", self.name, self.lhs, self.comparator, self.rhs)
    }
}
