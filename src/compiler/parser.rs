//! Recursive descent parser for objective and constraint expressions.
//!
//! Grammar (all binary operators left-associative):
//!
//! ```text
//! constraint := sum comparator sum
//! objective  := sum
//! sum        := product (('+' | '-') product)*
//! product    := unary (('*' | '/') unary)*
//! unary      := '-' unary | primary
//! primary    := NUMBER | IDENT | '(' sum ')'
//! ```

use super::ast::{BinOp, ConstraintExpr, Expr, Statement};
use super::token::{tokenize, Span, Token, TokenKind};
use crate::domain::Comparator;
use crate::error::CompileError;

/// Deepest allowed nesting of parentheses and unary minus combined.
pub const MAX_NESTING: usize = 128;

/// Which statement form the caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// No comparator allowed.
    Objective,
    /// Exactly one top-level comparator required.
    Constraint,
}

/// Parse an objective expression.
///
/// # Errors
///
/// Returns a lexing or parse error; a comparator anywhere is rejected.
pub fn parse_objective(source: &str) -> Result<Statement, CompileError> {
    parse(source, StatementKind::Objective)
}

/// Parse a constraint expression.
///
/// # Errors
///
/// Returns a lexing or parse error, including when the comparator is missing
/// or repeated.
pub fn parse_constraint(source: &str) -> Result<Statement, CompileError> {
    parse(source, StatementKind::Constraint)
}

/// Parse a statement of the given kind.
///
/// # Errors
///
/// See [`parse_objective`] and [`parse_constraint`].
pub fn parse(source: &str, kind: StatementKind) -> Result<Statement, CompileError> {
    match kind {
        StatementKind::Objective => objective_expr(source).map(Statement::Objective),
        StatementKind::Constraint => constraint_expr(source).map(Statement::from),
    }
}

/// Parse an objective into its single expression.
///
/// # Errors
///
/// See [`parse_objective`].
pub fn objective_expr(source: &str) -> Result<Expr, CompileError> {
    Parser::new(source)?.objective()
}

/// Parse a constraint into its two sides and comparator.
///
/// # Errors
///
/// See [`parse_constraint`].
pub fn constraint_expr(source: &str) -> Result<ConstraintExpr, CompileError> {
    Parser::new(source)?.constraint()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    depth: usize,
    nesting: usize,
}

fn error(position: usize, expected: impl Into<String>) -> CompileError {
    CompileError::Parse {
        position,
        expected: expected.into(),
    }
}

fn comparator_of(kind: &TokenKind) -> Option<Comparator> {
    match kind {
        TokenKind::Le => Some(Comparator::LessEqual),
        TokenKind::Ge => Some(Comparator::GreaterEqual),
        TokenKind::Eq => Some(Comparator::Equal),
        _ => None,
    }
}

impl Parser {
    fn new(source: &str) -> Result<Self, CompileError> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            end: source.len(),
            depth: 0,
            nesting: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.end, |t| t.span.start)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self, position: usize) -> Result<(), CompileError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(error(position, "shallower nesting"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn objective(&mut self) -> Result<Expr, CompileError> {
        let expr = self.sum()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) if token.kind.is_comparator() => Err(error(
                token.span.start,
                "end of expression (objectives take no comparator)",
            )),
            Some(token) => Err(error(token.span.start, "operator or end of expression")),
        }
    }

    fn constraint(&mut self) -> Result<ConstraintExpr, CompileError> {
        let lhs = self.sum()?;
        let Some(token) = self.peek() else {
            return Err(error(self.end, "comparator ('<=', '>=' or '=')"));
        };
        let Some(comparator) = comparator_of(&token.kind) else {
            return Err(error(token.span.start, "operator or end of expression"));
        };
        let op_pos = token.span.start;

        self.advance();
        let rhs = self.sum()?;
        self.expect_end()?;
        Ok(ConstraintExpr {
            lhs,
            comparator,
            rhs,
            op_pos,
        })
    }

    fn expect_end(&self) -> Result<(), CompileError> {
        match self.peek() {
            None => Ok(()),
            Some(token) if token.kind.is_comparator() => Err(error(
                token.span.start,
                "end of expression (only one comparator is allowed)",
            )),
            Some(token) => Err(error(token.span.start, "end of expression")),
        }
    }

    fn sum(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            let op_pos = self.position();
            self.advance();
            let rhs = self.product()?;
            lhs = Expr::binary(op, lhs, rhs, op_pos);
        }
    }

    fn product(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            let op_pos = self.position();
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs, op_pos);
        }
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        if let Some(Token {
            kind: TokenKind::Minus,
            span,
        }) = self.peek().cloned()
        {
            self.advance();
            self.enter(span.start)?;
            let inner = self.unary()?;
            self.leave();
            return Ok(Expr::neg(inner, span));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        let position = self.position();
        let Some(token) = self.advance() else {
            return Err(error(position, "operand"));
        };

        match token.kind {
            TokenKind::Number(value) => Ok(Expr::number(value, token.span)),
            TokenKind::Ident(name) => Ok(Expr::ident(name, token.span)),
            TokenKind::LParen => {
                self.depth += 1;
                self.enter(token.span.start)?;
                let inner = self.sum()?;
                let close = self.position();
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        span,
                    }) => {
                        self.depth -= 1;
                        self.leave();
                        let mut inner = inner;
                        inner.span = token.span.join(span);
                        Ok(inner)
                    }
                    Some(Token { kind, .. }) if kind.is_comparator() => Err(error(
                        close,
                        "')' (comparators are not allowed inside parentheses)",
                    )),
                    Some(_) => Err(error(close, "')'")),
                    None => Err(error(close, "')' to close the '(' opened")),
                }
            }
            TokenKind::RParen if self.depth == 0 => {
                Err(error(position, "operand (unmatched ')')"))
            }
            _ => Err(error(position, "operand")),
        }
    }
}

/// Span helper for callers that only need an expression's text.
#[must_use]
pub fn excerpt(source: &str, span: Span) -> String {
    span.slice(source).trim().to_string()
}
