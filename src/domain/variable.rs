//! Decision variables and their bounds.

use serde::{Deserialize, Serialize};

use super::ids::VariableId;

/// Value domain of a decision variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableDomain {
    /// Any real value within the bounds.
    #[default]
    Continuous,
    /// Integer values within the bounds.
    Integer,
    /// 0 or 1.
    Binary,
}

impl VariableDomain {
    /// Return `true` if the solver must enforce integrality.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Integer | Self::Binary)
    }
}

/// Bounds on a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    /// Lower bound (None = -infinity).
    pub lower: Option<f64>,
    /// Upper bound (None = +infinity).
    pub upper: Option<f64>,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            lower: Some(0.0),
            upper: None,
        }
    }
}

impl VariableBounds {
    /// Binary variable bounds [0, 1].
    #[must_use]
    pub const fn binary() -> Self {
        Self {
            lower: Some(0.0),
            upper: Some(1.0),
        }
    }

    /// Free variable (no bounds).
    #[must_use]
    pub const fn free() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// Non-negative variable [0, +inf).
    #[must_use]
    pub fn non_negative() -> Self {
        Self::default()
    }

    /// Bounded variable [lower, upper].
    #[must_use]
    pub const fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Return `true` when both bounds lie inside [0, 1].
    #[must_use]
    pub fn is_within_unit(&self) -> bool {
        let inside = |b: Option<f64>| b.is_some_and(|v| (0.0..=1.0).contains(&v));
        inside(self.lower) && inside(self.upper)
    }

    /// Return `true` when lower does not exceed upper.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => lower <= upper,
            _ => true,
        }
    }
}

/// Declaration of a decision variable, before it is admitted to a model.
///
/// ```
/// use datasolver::domain::{VariableDomain, VariableSpec};
///
/// let spec = VariableSpec::new("estoque").upper(100.0).domain(VariableDomain::Integer);
/// assert_eq!(spec.bounds.upper, Some(100.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub name: String,
    pub bounds: VariableBounds,
    pub domain: VariableDomain,
}

impl VariableSpec {
    /// Continuous variable in [0, +inf).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: VariableBounds::default(),
            domain: VariableDomain::Continuous,
        }
    }

    #[must_use]
    pub fn lower(mut self, lower: impl Into<Option<f64>>) -> Self {
        self.bounds.lower = lower.into();
        self
    }

    #[must_use]
    pub fn upper(mut self, upper: impl Into<Option<f64>>) -> Self {
        self.bounds.upper = upper.into();
        self
    }

    #[must_use]
    pub fn bounds(mut self, bounds: VariableBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the domain. Binary also resets the bounds to [0, 1].
    #[must_use]
    pub fn domain(mut self, domain: VariableDomain) -> Self {
        self.domain = domain;
        if domain == VariableDomain::Binary {
            self.bounds = VariableBounds::binary();
        }
        self
    }
}

/// A decision variable registered in a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: VariableId,
    pub bounds: VariableBounds,
    pub domain: VariableDomain,
}

impl Variable {
    /// Create a variable from a declaration, under the given identifier.
    pub fn from_spec(id: VariableId, spec: &VariableSpec) -> Self {
        Self {
            id,
            bounds: spec.bounds,
            domain: spec.domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_are_non_negative() {
        let spec = VariableSpec::new("x");
        assert_eq!(spec.bounds.lower, Some(0.0));
        assert_eq!(spec.bounds.upper, None);
        assert_eq!(spec.domain, VariableDomain::Continuous);
    }

    #[test]
    fn binary_domain_forces_unit_bounds() {
        let spec = VariableSpec::new("y").upper(10.0).domain(VariableDomain::Binary);
        assert_eq!(spec.bounds, VariableBounds::binary());
        assert!(spec.domain.is_integer());
    }

    #[test]
    fn bounds_set_after_binary_domain_are_kept() {
        let spec = VariableSpec::new("b").domain(VariableDomain::Binary).upper(10.0);
        assert_eq!(spec.bounds, VariableBounds::bounded(0.0, 10.0));
        assert!(!spec.bounds.is_within_unit());
        assert!(VariableBounds::binary().is_within_unit());
        assert!(!VariableBounds::free().is_within_unit());
    }

    #[test]
    fn inverted_bounds_are_inconsistent() {
        assert!(!VariableBounds::bounded(5.0, 1.0).is_consistent());
        assert!(VariableBounds::free().is_consistent());
        assert!(VariableBounds::bounded(1.0, 1.0).is_consistent());
    }
}
