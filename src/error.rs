//! Error types for the crate.
//!
//! Each layer owns a structured error enum; [`Error`] aggregates them so
//! callers can use a single [`Result`] alias with `?`.

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised while turning expression text into a model.
///
/// All of these are input errors: they are reported synchronously with the
/// offending position or identifier and are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("unexpected character '{found}' at offset {offset}")]
    Lex { offset: usize, found: char },

    #[error("expression is empty")]
    EmptyExpression,

    #[error("expected {expected} at offset {position}")]
    Parse { position: usize, expected: String },

    #[error("unknown identifier '{name}' at offset {position}")]
    UnknownIdentifier { name: String, position: usize },

    #[error("non-linear expression '{expression}' at offset {position}")]
    NonLinearExpression { position: usize, expression: String },

    #[error("division by zero at offset {position}")]
    DivisionByZero { position: usize },

    #[error("non-finite value produced by '{expression}' at offset {position}")]
    NonFiniteValue { position: usize, expression: String },

    #[error("'{identifier}' does not share the row keys of the other per-row values")]
    RowMismatch { identifier: String },

    #[error("'{name}' is not bound to a per-row column")]
    NotASeries { name: String },

    #[error("variable '{name}' is already declared")]
    DuplicateVariable { name: String },

    #[error("data binding '{name}' is already declared")]
    DuplicateBinding { name: String },

    #[error("invalid bounds for '{name}': [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },

    #[error("objective is already set")]
    ObjectiveAlreadySet,

    #[error("model has no objective")]
    NoObjective,

    #[error("model declares no variables")]
    EmptyModel,
}

impl CompileError {
    /// Byte offset into the source expression, when the error has one.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex { offset, .. } => Some(*offset),
            Self::Parse { position, .. }
            | Self::UnknownIdentifier { position, .. }
            | Self::NonLinearExpression { position, .. }
            | Self::DivisionByZero { position }
            | Self::NonFiniteValue { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Errors raised by data sources and the source registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("data source '{name}' not found")]
    UnknownSource { name: String },

    #[error("data source '{name}' already exists")]
    DuplicateSource { name: String },

    #[error("unsupported database dialect '{dialect}'")]
    UnsupportedDialect { dialect: String },

    #[error("table '{table}' not found")]
    UnknownTable { table: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("column '{column}' has no value in row '{row}'")]
    MissingValue { column: String, row: String },

    #[error("column '{column}' holds a non-numeric {found} value in row '{row}'")]
    NonNumeric {
        column: String,
        row: String,
        found: String,
    },

    #[error("aggregate query returned {rows} rows, expected exactly one")]
    NotScalar { rows: usize },
}

/// Solver outcomes that are not an optimal solution.
///
/// Solvers report these as a [`SolutionStatus`](crate::domain::SolutionStatus);
/// [`Solution::into_result`](crate::domain::Solution::into_result) converts
/// them for callers that prefer `?`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("solver stopped at the time limit")]
    Timeout,

    #[error("model is infeasible")]
    Infeasible,

    #[error("model is unbounded")]
    Unbounded,

    #[error("solver backend failed: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    /// A compile error for one statement of a problem file.
    #[error("{label} '{expression}': {source}")]
    Statement {
        label: String,
        expression: String,
        #[source]
        source: CompileError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_reports_position() {
        let err = CompileError::DivisionByZero { position: 4 };
        assert_eq!(err.position(), Some(4));
        assert_eq!(CompileError::NoObjective.position(), None);
    }

    #[test]
    fn errors_convert_into_crate_error() {
        let err: Error = CompileError::EmptyModel.into();
        assert!(matches!(err, Error::Compile(CompileError::EmptyModel)));

        let err: Error = DataError::NotScalar { rows: 2 }.into();
        assert_eq!(
            err.to_string(),
            "aggregate query returned 2 rows, expected exactly one"
        );
    }

    #[test]
    fn statement_error_names_expression() {
        let err = Error::Statement {
            label: "constraint 2".into(),
            expression: "x / 0 >= 1".into(),
            source: CompileError::DivisionByZero { position: 2 },
        };
        assert_eq!(
            err.to_string(),
            "constraint 2 'x / 0 >= 1': division by zero at offset 2"
        );
    }
}
