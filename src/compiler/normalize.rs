//! Linear normalizer.
//!
//! Reduces a bound expression to a [`LinearForm`]. Products and quotients
//! are only linear when one side folds to a constant; anything else is
//! rejected rather than approximated.

use super::ast::BinOp;
use super::binder::{row_keys, BoundExpr, BoundKind, BoundStatement, Leaf};
use super::parser::excerpt;
use crate::domain::{Comparator, LinearForm, RowKey};
use crate::error::CompileError;

/// A constraint after normalization: variables left, constant right.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedConstraint {
    /// Row the constraint was instantiated for, if per-row.
    pub row: Option<RowKey>,
    pub lhs: LinearForm,
    pub comparator: Comparator,
    pub rhs: f64,
}

/// Result of normalizing a whole statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// Objective form, summed over rows when per-row.
    Objective(LinearForm),
    /// One constraint, or one per row.
    Constraints(Vec<NormalizedConstraint>),
}

/// Normalize a bound statement, expanding it over its rows.
///
/// # Errors
///
/// Returns [`CompileError::NonLinearExpression`], [`CompileError::DivisionByZero`],
/// [`CompileError::NonFiniteValue`] or [`CompileError::RowMismatch`].
pub fn normalize(statement: &BoundStatement, source: &str) -> Result<Normalized, CompileError> {
    match statement {
        BoundStatement::Objective(expr) => {
            normalize_objective(expr, source).map(Normalized::Objective)
        }
        BoundStatement::Constraint {
            lhs,
            comparator,
            rhs,
        } => normalize_constraints(lhs, *comparator, rhs, source).map(Normalized::Constraints),
    }
}

/// Normalize an objective, summing it over its rows when per-row.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_objective(expr: &BoundExpr, source: &str) -> Result<LinearForm, CompileError> {
    match row_keys([expr])? {
        None => normalize_expr(expr, 0, source),
        Some(keys) => {
            let mut total = LinearForm::zero();
            for row in 0..keys.len() {
                total = total + normalize_expr(expr, row, source)?;
            }
            Ok(total)
        }
    }
}

/// Normalize a constraint into one constraint, or one per row.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_constraints(
    lhs: &BoundExpr,
    comparator: Comparator,
    rhs: &BoundExpr,
    source: &str,
) -> Result<Vec<NormalizedConstraint>, CompileError> {
    match row_keys([lhs, rhs])? {
        None => Ok(vec![normalize_constraint(lhs, comparator, rhs, 0, None, source)?]),
        Some(keys) => keys
            .into_iter()
            .enumerate()
            .map(|(row, key)| normalize_constraint(lhs, comparator, rhs, row, Some(key), source))
            .collect(),
    }
}

/// Move every variable to the left and every constant to the right:
/// `lhs - rhs_vars ⋈ rhs_const - lhs_const`.
fn normalize_constraint(
    lhs: &BoundExpr,
    comparator: Comparator,
    rhs: &BoundExpr,
    row: usize,
    key: Option<RowKey>,
    source: &str,
) -> Result<NormalizedConstraint, CompileError> {
    let left = normalize_expr(lhs, row, source)?;
    let right = normalize_expr(rhs, row, source)?;
    let mut form = left - right;
    let constant = form.take_constant();
    Ok(NormalizedConstraint {
        row: key,
        lhs: form,
        comparator,
        rhs: -constant,
    })
}

/// Reduce an expression evaluated at `row` to a linear form.
///
/// Per-row series are pinned to the row's value and family variables to the
/// row's member; scalars and plain variables are shared by every row.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_expr(
    expr: &BoundExpr,
    row: usize,
    source: &str,
) -> Result<LinearForm, CompileError> {
    let form = match &expr.kind {
        BoundKind::Leaf(leaf) => leaf_form(leaf, row)?,
        BoundKind::Neg(inner) => -normalize_expr(inner, row, source)?,
        BoundKind::Binary { op, lhs, rhs } => {
            let left = normalize_expr(lhs, row, source)?;
            let right = normalize_expr(rhs, row, source)?;
            match op {
                BinOp::Add => left + right,
                BinOp::Sub => left - right,
                BinOp::Mul => {
                    if left.is_constant() {
                        right * left.constant_term()
                    } else if right.is_constant() {
                        left * right.constant_term()
                    } else {
                        return Err(non_linear(expr, source));
                    }
                }
                BinOp::Div => {
                    if !right.is_constant() {
                        return Err(non_linear(expr, source));
                    }
                    let divisor = right.constant_term();
                    if divisor == 0.0 {
                        return Err(CompileError::DivisionByZero {
                            position: expr.op_pos,
                        });
                    }
                    left / divisor
                }
            }
        }
    };

    if !form.is_finite() {
        return Err(CompileError::NonFiniteValue {
            position: expr.span.start,
            expression: excerpt(source, expr.span),
        });
    }
    Ok(form)
}

fn non_linear(expr: &BoundExpr, source: &str) -> CompileError {
    CompileError::NonLinearExpression {
        position: expr.op_pos,
        expression: excerpt(source, expr.span),
    }
}

fn leaf_form(leaf: &Leaf, row: usize) -> Result<LinearForm, CompileError> {
    match leaf {
        Leaf::Number(value) | Leaf::Scalar(value) => Ok(LinearForm::constant(*value)),
        Leaf::Variable(id) => Ok(LinearForm::term(id.clone(), 1.0)),
        Leaf::Family(family) => family
            .member(row)
            .map(|id| LinearForm::term(id, 1.0))
            .ok_or_else(|| CompileError::RowMismatch {
                identifier: family.name.clone(),
            }),
        Leaf::Series { name, series } => series
            .value(row)
            .map(LinearForm::constant)
            .ok_or_else(|| CompileError::RowMismatch {
                identifier: name.clone(),
            }),
    }
}
