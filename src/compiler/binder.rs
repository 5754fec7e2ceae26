//! Binding resolver.
//!
//! Replaces every identifier of a parsed statement with what it refers to:
//! a declared variable, a variable family, or a data value. Declared
//! variables always win over a data binding of the same name.

use std::sync::Arc;

use super::ast::{BinOp, Expr, ExprKind, Statement};
use super::token::Span;
use crate::domain::{Comparator, DataBinding, RowKey, Series, VariableId};
use crate::error::CompileError;

/// A variable declared once per row of a data binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    pub name: String,
    pub keys: Vec<RowKey>,
}

impl Family {
    /// Member variable for the row at `index`.
    #[must_use]
    pub fn member(&self, index: usize) -> Option<VariableId> {
        self.keys
            .get(index)
            .map(|key| VariableId::indexed(&self.name, key))
    }

    pub fn members(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.keys
            .iter()
            .map(move |key| VariableId::indexed(&self.name, key))
    }
}

/// A declared decision symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VariableId),
    Family(Arc<Family>),
}

/// Lookup capabilities the resolver needs.
pub trait Scope {
    /// Resolve an identifier to a declared variable or family.
    fn symbol(&self, name: &str) -> Option<Symbol>;

    /// Resolve an identifier to already-fetched data.
    fn data(&self, name: &str) -> Option<DataBinding>;
}

/// Resolved leaf of a bound expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Number(f64),
    Variable(VariableId),
    Family(Arc<Family>),
    Scalar(f64),
    Series { name: String, series: Arc<Series> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundKind {
    Leaf(Leaf),
    Neg(Box<BoundExpr>),
    Binary {
        op: BinOp,
        lhs: Box<BoundExpr>,
        rhs: Box<BoundExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundExpr {
    pub kind: BoundKind,
    pub span: Span,
    pub op_pos: usize,
}

impl BoundExpr {
    fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a Leaf)) {
        match &self.kind {
            BoundKind::Leaf(leaf) => f(leaf),
            BoundKind::Neg(inner) => inner.for_each_leaf(f),
            BoundKind::Binary { lhs, rhs, .. } => {
                lhs.for_each_leaf(f);
                rhs.for_each_leaf(f);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundStatement {
    Objective(BoundExpr),
    Constraint {
        lhs: BoundExpr,
        comparator: Comparator,
        rhs: BoundExpr,
    },
}

impl BoundStatement {
    /// Row keys the statement must be evaluated over.
    ///
    /// # Errors
    ///
    /// See [`row_keys`].
    pub fn row_keys(&self) -> Result<Option<Vec<RowKey>>, CompileError> {
        match self {
            Self::Objective(expr) => row_keys([expr]),
            Self::Constraint { lhs, rhs, .. } => row_keys([lhs, rhs]),
        }
    }
}

/// Row keys a set of expressions must be evaluated over.
///
/// `None` means no per-row identifier appears and the expressions are
/// evaluated once. Every series and family must share the same key sequence.
///
/// # Errors
///
/// Returns [`CompileError::RowMismatch`] naming the first identifier
/// whose keys differ from the first per-row identifier's.
pub fn row_keys<'a>(
    exprs: impl IntoIterator<Item = &'a BoundExpr>,
) -> Result<Option<Vec<RowKey>>, CompileError> {
    let mut reference: Option<Vec<RowKey>> = None;
    let mut mismatch: Option<String> = None;

    let mut check = |leaf: &Leaf| {
        if mismatch.is_some() {
            return;
        }
        let (name, keys): (&str, Vec<&RowKey>) = match leaf {
            Leaf::Series { name, series } => (name.as_str(), series.keys().collect()),
            Leaf::Family(family) => (family.name.as_str(), family.keys.iter().collect()),
            _ => return,
        };
        match &reference {
            None => reference = Some(keys.into_iter().cloned().collect()),
            Some(expected) => {
                if !expected.iter().eq(keys.iter().copied()) {
                    mismatch = Some(name.to_string());
                }
            }
        }
    };
    for expr in exprs {
        expr.for_each_leaf(&mut check);
    }

    match mismatch {
        Some(identifier) => Err(CompileError::RowMismatch { identifier }),
        None => Ok(reference),
    }
}

/// Resolve every identifier of a parsed statement.
///
/// # Errors
///
/// Returns [`CompileError::UnknownIdentifier`] for an identifier that is
/// neither a declared symbol nor bound data.
pub fn bind(statement: &Statement, scope: &impl Scope) -> Result<BoundStatement, CompileError> {
    match statement {
        Statement::Objective(expr) => Ok(BoundStatement::Objective(bind_expr(expr, scope)?)),
        Statement::Constraint {
            lhs,
            comparator,
            rhs,
            ..
        } => Ok(BoundStatement::Constraint {
            lhs: bind_expr(lhs, scope)?,
            comparator: *comparator,
            rhs: bind_expr(rhs, scope)?,
        }),
    }
}

/// Resolve every identifier of one expression.
///
/// # Errors
///
/// See [`bind`].
pub fn bind_expr(expr: &Expr, scope: &impl Scope) -> Result<BoundExpr, CompileError> {
    let kind = match &expr.kind {
        ExprKind::Number(value) => BoundKind::Leaf(Leaf::Number(*value)),
        ExprKind::Ident(name) => BoundKind::Leaf(resolve(name, expr.span, scope)?),
        ExprKind::Neg(inner) => BoundKind::Neg(Box::new(bind_expr(inner, scope)?)),
        ExprKind::Binary { op, lhs, rhs } => BoundKind::Binary {
            op: *op,
            lhs: Box::new(bind_expr(lhs, scope)?),
            rhs: Box::new(bind_expr(rhs, scope)?),
        },
    };
    Ok(BoundExpr {
        kind,
        span: expr.span,
        op_pos: expr.op_pos,
    })
}

fn resolve(name: &str, span: Span, scope: &impl Scope) -> Result<Leaf, CompileError> {
    if let Some(symbol) = scope.symbol(name) {
        return Ok(match symbol {
            Symbol::Variable(id) => Leaf::Variable(id),
            Symbol::Family(family) => Leaf::Family(family),
        });
    }
    match scope.data(name) {
        Some(DataBinding::Scalar(value)) => Ok(Leaf::Scalar(value)),
        Some(DataBinding::Series(series)) => Ok(Leaf::Series {
            name: name.to_string(),
            series,
        }),
        None => Err(CompileError::UnknownIdentifier {
            name: name.to_string(),
            position: span.start,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parser::{parse_constraint, parse_objective};
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestScope {
        symbols: HashMap<String, Symbol>,
        data: HashMap<String, DataBinding>,
    }

    impl Scope for TestScope {
        fn symbol(&self, name: &str) -> Option<Symbol> {
            self.symbols.get(name).cloned()
        }

        fn data(&self, name: &str) -> Option<DataBinding> {
            self.data.get(name).cloned()
        }
    }

    fn scope() -> TestScope {
        let mut scope = TestScope::default();
        scope
            .symbols
            .insert("estoque".into(), Symbol::Variable(VariableId::new("estoque")));
        scope.data.insert("custo".into(), DataBinding::Scalar(3.0));
        scope.data.insert(
            "previsao_venda".into(),
            DataBinding::series([("a", 1.0), ("b", 2.0), ("c", 3.0)]),
        );
        scope
    }

    fn leaves(statement: &BoundStatement) -> Vec<Leaf> {
        let mut out = Vec::new();
        let mut push = |leaf: &Leaf| out.push(leaf.clone());
        match statement {
            BoundStatement::Objective(expr) => expr.for_each_leaf(&mut push),
            BoundStatement::Constraint { lhs, rhs, .. } => {
                lhs.for_each_leaf(&mut push);
                rhs.for_each_leaf(&mut push);
            }
        }
        out
    }

    #[test]
    fn resolves_variables_and_data() {
        let statement = parse_objective("estoque * custo").unwrap();
        let bound = bind(&statement, &scope()).unwrap();
        assert_eq!(
            leaves(&bound),
            vec![
                Leaf::Variable(VariableId::new("estoque")),
                Leaf::Scalar(3.0)
            ]
        );
    }

    #[test]
    fn variable_takes_precedence_over_column() {
        let mut scope = scope();
        scope.data.insert("estoque".into(), DataBinding::Scalar(99.0));
        let bound = bind(&parse_objective("estoque").unwrap(), &scope).unwrap();
        assert_eq!(
            leaves(&bound),
            vec![Leaf::Variable(VariableId::new("estoque"))]
        );
    }

    #[test]
    fn unknown_identifier_reports_position() {
        let err = bind(&parse_objective("estoque + preco").unwrap(), &scope()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownIdentifier {
                name: "preco".into(),
                position: 10
            }
        );
    }

    #[test]
    fn scalar_only_statement_has_no_rows() {
        let bound = bind(&parse_constraint("estoque <= custo").unwrap(), &scope()).unwrap();
        assert_eq!(bound.row_keys().unwrap(), None);
    }

    #[test]
    fn series_defines_row_keys() {
        let bound = bind(
            &parse_constraint("estoque >= previsao_venda").unwrap(),
            &scope(),
        )
        .unwrap();
        let keys = bound.row_keys().unwrap().unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].as_str(), "a");
    }

    #[test]
    fn family_must_match_series_keys() {
        let mut scope = scope();
        scope.symbols.insert(
            "compra".into(),
            Symbol::Family(Arc::new(Family {
                name: "compra".into(),
                keys: vec![RowKey::new("a"), RowKey::new("b")],
            })),
        );
        let bound = bind(
            &parse_constraint("compra >= previsao_venda").unwrap(),
            &scope,
        )
        .unwrap();
        assert_eq!(
            bound.row_keys().unwrap_err(),
            CompileError::RowMismatch {
                identifier: "previsao_venda".into()
            }
        );
    }

    #[test]
    fn family_members_use_row_keys() {
        let family = Family {
            name: "compra".into(),
            keys: vec![RowKey::new("a"), RowKey::new("b")],
        };
        assert_eq!(family.member(1), Some(VariableId::new("compra[b]")));
        assert_eq!(family.member(2), None);
        assert_eq!(family.members().count(), 2);
    }
}
