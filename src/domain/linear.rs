//! Canonical linear form: `Σ coefficient × variable + constant`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::ids::VariableId;

/// A linear expression in canonical form.
///
/// Keys are unique and ordered; a form without terms is a pure constant.
/// Only coefficients that are exactly zero are pruned, so a tiny but
/// non-zero coefficient keeps its variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearForm {
    terms: BTreeMap<VariableId, f64>,
    constant: f64,
}

impl LinearForm {
    /// The zero form.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// A pure constant.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// A single `coefficient × variable` term.
    #[must_use]
    pub fn term(id: VariableId, coefficient: f64) -> Self {
        let mut form = Self::zero();
        if coefficient != 0.0 {
            form.terms.insert(id, coefficient);
        }
        form
    }

    /// Return `true` if no variable remains.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// The constant term.
    #[must_use]
    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Coefficient of `id`, zero when absent.
    #[must_use]
    pub fn coefficient(&self, id: &VariableId) -> f64 {
        self.terms.get(id).copied().unwrap_or(0.0)
    }

    /// Iterate `(variable, coefficient)` pairs in identifier order.
    pub fn terms(&self) -> impl Iterator<Item = (&VariableId, f64)> {
        self.terms.iter().map(|(id, c)| (id, *c))
    }

    /// Number of non-zero terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Return `true` if every coefficient and the constant are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.constant.is_finite() && self.terms.values().all(|c| c.is_finite())
    }

    /// Drop the constant term, returning it.
    pub fn take_constant(&mut self) -> f64 {
        std::mem::take(&mut self.constant)
    }

    /// Evaluate at a variable assignment; missing variables count as zero.
    #[must_use]
    pub fn evaluate(&self, values: &BTreeMap<VariableId, f64>) -> f64 {
        self.terms
            .iter()
            .map(|(id, c)| c * values.get(id).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }

    /// Multiply every coefficient and the constant by `k`.
    #[must_use]
    pub fn scale(mut self, k: f64) -> Self {
        self.constant *= k;
        for c in self.terms.values_mut() {
            *c *= k;
        }
        self.prune();
        self
    }

    fn merge(&mut self, other: &LinearForm, sign: f64) {
        self.constant += sign * other.constant;
        for (id, c) in &other.terms {
            *self.terms.entry(id.clone()).or_insert(0.0) += sign * c;
        }
        self.prune();
    }

    fn prune(&mut self) {
        self.terms.retain(|_, c| *c != 0.0);
    }
}

impl Add for LinearForm {
    type Output = LinearForm;

    fn add(mut self, rhs: LinearForm) -> LinearForm {
        self.merge(&rhs, 1.0);
        self
    }
}

impl Sub for LinearForm {
    type Output = LinearForm;

    fn sub(mut self, rhs: LinearForm) -> LinearForm {
        self.merge(&rhs, -1.0);
        self
    }
}

impl Neg for LinearForm {
    type Output = LinearForm;

    fn neg(self) -> LinearForm {
        self.scale(-1.0)
    }
}

impl Mul<f64> for LinearForm {
    type Output = LinearForm;

    fn mul(self, rhs: f64) -> LinearForm {
        self.scale(rhs)
    }
}

impl Div<f64> for LinearForm {
    type Output = LinearForm;

    fn div(mut self, rhs: f64) -> LinearForm {
        self.constant /= rhs;
        for c in self.terms.values_mut() {
            *c /= rhs;
        }
        self.prune();
        self
    }
}

impl std::iter::Sum for LinearForm {
    fn sum<I: Iterator<Item = LinearForm>>(iter: I) -> Self {
        iter.fold(LinearForm::zero(), |acc, form| acc + form)
    }
}

impl fmt::Display for LinearForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (id, c) in &self.terms {
            if first {
                write!(f, "{c} {id}")?;
                first = false;
            } else if *c < 0.0 {
                write!(f, " - {} {id}", -c)?;
            } else {
                write!(f, " + {c} {id}")?;
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant != 0.0 {
            if self.constant < 0.0 {
                write!(f, " - {}", -self.constant)
            } else {
                write!(f, " + {}", self.constant)
            }
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> VariableId {
        VariableId::new("x")
    }

    fn y() -> VariableId {
        VariableId::new("y")
    }

    #[test]
    fn add_merges_coefficients_by_key() {
        let a = LinearForm::term(x(), 1.0) + LinearForm::constant(2.0);
        let b = LinearForm::term(x(), 3.0) + LinearForm::term(y(), 1.0);
        let sum = a + b;
        assert_eq!(sum.coefficient(&x()), 4.0);
        assert_eq!(sum.coefficient(&y()), 1.0);
        assert_eq!(sum.constant_term(), 2.0);
    }

    #[test]
    fn sub_prunes_cancelled_terms() {
        let a = LinearForm::term(x(), 2.0);
        let b = LinearForm::term(x(), 2.0);
        let diff = a - b;
        assert!(diff.is_constant());
        assert_eq!(diff.len(), 0);
    }

    #[test]
    fn scale_multiplies_constant_too() {
        let form = (LinearForm::term(x(), 1.0) + LinearForm::constant(3.0)) * 0.5;
        assert_eq!(form.coefficient(&x()), 0.5);
        assert_eq!(form.constant_term(), 1.5);
    }

    #[test]
    fn div_divides_every_coefficient() {
        let form = (LinearForm::term(x(), 1.0) + LinearForm::constant(3.0)) / 2.0;
        assert_eq!(form.coefficient(&x()), 0.5);
        assert_eq!(form.constant_term(), 1.5);
    }

    #[test]
    fn zero_coefficient_term_is_constant() {
        assert!(LinearForm::term(x(), 0.0).is_constant());
    }

    #[test]
    fn tiny_coefficients_are_kept() {
        let form = LinearForm::term(x(), 1.0) * 1e-13;
        assert!(!form.is_constant());
        assert_eq!(form.coefficient(&x()), 1e-13);

        let values = BTreeMap::from([(x(), 1e13)]);
        assert!((form.evaluate(&values) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn evaluate_at_assignment() {
        let form = LinearForm::term(x(), 2.0) - LinearForm::term(y(), 1.0) + LinearForm::constant(1.0);
        let values = BTreeMap::from([(x(), 3.0), (y(), 4.0)]);
        assert_eq!(form.evaluate(&values), 3.0);
    }

    #[test]
    fn display_is_readable() {
        let form = LinearForm::term(x(), 2.0) - LinearForm::term(y(), 1.0) + LinearForm::constant(-4.0);
        assert_eq!(form.to_string(), "2 x - 1 y - 4");
        assert_eq!(LinearForm::constant(7.0).to_string(), "7");
    }
}
