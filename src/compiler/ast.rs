//! Expression syntax tree.

use super::token::Span;
use crate::domain::Comparator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(f64),
    Ident(String),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// An arithmetic expression node with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Start of the operator token for `Neg` and `Binary` nodes.
    pub op_pos: usize,
}

impl Expr {
    pub fn number(value: f64, span: Span) -> Self {
        Self {
            kind: ExprKind::Number(value),
            span,
            op_pos: span.start,
        }
    }

    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ExprKind::Ident(name.into()),
            span,
            op_pos: span.start,
        }
    }

    pub fn neg(inner: Expr, op_span: Span) -> Self {
        let span = op_span.join(inner.span);
        Self {
            kind: ExprKind::Neg(Box::new(inner)),
            span,
            op_pos: op_span.start,
        }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr, op_pos: usize) -> Self {
        let span = lhs.span.join(rhs.span);
        Self {
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
            op_pos,
        }
    }

    /// Visit every identifier leaf, left to right.
    pub fn for_each_ident<'a>(&'a self, f: &mut impl FnMut(&'a str, Span)) {
        match &self.kind {
            ExprKind::Number(_) => {}
            ExprKind::Ident(name) => f(name, self.span),
            ExprKind::Neg(inner) => inner.for_each_ident(f),
            ExprKind::Binary { lhs, rhs, .. } => {
                lhs.for_each_ident(f);
                rhs.for_each_ident(f);
            }
        }
    }
}

/// A parsed constraint, `lhs comparator rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintExpr {
    pub lhs: Expr,
    pub comparator: Comparator,
    pub rhs: Expr,
    /// Byte offset of the comparator.
    pub op_pos: usize,
}

impl ConstraintExpr {
    pub fn for_each_ident<'a>(&'a self, f: &mut impl FnMut(&'a str, Span)) {
        self.lhs.for_each_ident(f);
        self.rhs.for_each_ident(f);
    }
}

impl From<ConstraintExpr> for Statement {
    fn from(c: ConstraintExpr) -> Self {
        Statement::Constraint {
            lhs: c.lhs,
            comparator: c.comparator,
            rhs: c.rhs,
            op_pos: c.op_pos,
        }
    }
}

/// A parsed objective or constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Objective(Expr),
    Constraint {
        lhs: Expr,
        comparator: Comparator,
        rhs: Expr,
        op_pos: usize,
    },
}

impl Statement {
    pub fn for_each_ident<'a>(&'a self, f: &mut impl FnMut(&'a str, Span)) {
        match self {
            Self::Objective(expr) => expr.for_each_ident(f),
            Self::Constraint { lhs, rhs, .. } => {
                lhs.for_each_ident(f);
                rhs.for_each_ident(f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_span_covers_operands() {
        let lhs = Expr::ident("x", Span::new(0, 1));
        let rhs = Expr::number(2.0, Span::new(4, 5));
        let expr = Expr::binary(BinOp::Mul, lhs, rhs, 2);
        assert_eq!(expr.span, Span::new(0, 5));
        assert_eq!(expr.op_pos, 2);
    }

    #[test]
    fn collects_identifiers_in_order() {
        let expr = Expr::binary(
            BinOp::Add,
            Expr::ident("a", Span::new(0, 1)),
            Expr::neg(Expr::ident("b", Span::new(5, 6)), Span::new(4, 5)),
            2,
        );
        let mut names = Vec::new();
        expr.for_each_ident(&mut |name, _| names.push(name));
        assert_eq!(names, ["a", "b"]);
    }
}
