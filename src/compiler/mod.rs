//! Expression compiler.
//!
//! Turns objective and constraint strings into normalized linear forms:
//!
//! ```text
//! text ─► token ─► parser (ast) ─► binder ─► normalize ─► builder ─► Model
//! ```
//!
//! Every stage is pure except the builder, which fetches data bindings on
//! first use.

pub mod ast;
pub mod binder;
pub mod builder;
pub mod normalize;
pub mod parser;
pub mod token;

pub use binder::{bind, bind_expr, row_keys, Family, Scope, Symbol};
pub use builder::ModelBuilder;
pub use normalize::{
    normalize, normalize_constraints, normalize_objective, Normalized, NormalizedConstraint,
};
pub use parser::{
    constraint_expr, objective_expr, parse, parse_constraint, parse_objective, StatementKind,
    MAX_NESTING,
};
pub use token::{tokenize, Span, Token, TokenKind};
