//! Miette-based error diagnostics for CLI error presentation.
//!
//! Expression errors are shown with the expression text and a caret under
//! the offending span; TOML errors point into the file that failed to parse.

use std::path::Path;

use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

use crate::adapter::outbound::registry::SUPPORTED_DIALECTS;
use crate::error::{CompileError, ConfigError, DataError, Error};

/// An objective or constraint that failed to compile.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(datasolver::expression))]
pub struct ExpressionError {
    /// Human-readable error message.
    pub message: String,

    /// The expression text.
    #[source_code]
    pub src: NamedSource<String>,

    #[label("{label}")]
    pub span: SourceSpan,

    /// Short description shown under the caret.
    pub label: String,

    #[help]
    pub help: Option<String>,
}

impl ExpressionError {
    /// Build a diagnostic for `error` raised while compiling `expression`.
    #[must_use]
    pub fn new(name: &str, expression: &str, error: &CompileError) -> Self {
        let (offset, len, label) = locate(expression, error);
        Self {
            message: error.to_string(),
            src: NamedSource::new(name, expression.to_string()),
            span: (offset, len).into(),
            label,
            help: help_for(error),
        }
    }
}

/// A TOML file that failed to parse or validate.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(datasolver::config))]
pub struct FileError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: SourceSpan,

    #[help]
    pub help: Option<String>,
}

/// Any other failure.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(datasolver::error))]
pub struct PlainError {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl PlainError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    /// Add a help suggestion to the error.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Read a TOML file, reporting a missing file plainly.
///
/// # Errors
///
/// Returns a report naming the path when the file cannot be read.
pub fn read_source(path: &Path) -> miette::Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        Report::new(PlainError::new(format!(
            "failed to read {}: {e}",
            path.display()
        )))
    })
}

/// Convert a crate error into a report.
#[must_use]
pub fn report(err: Error) -> Report {
    match err {
        Error::Statement {
            label,
            expression,
            source,
        } => Report::new(ExpressionError::new(&label, &expression, &source)),
        other => {
            let help = match &other {
                Error::Data(DataError::UnknownSource { .. }) => Some(
                    "declare the database under [[databases]] in the configuration".to_string(),
                ),
                Error::Data(DataError::UnsupportedDialect { .. }) => Some(format!(
                    "supported dialects: {}",
                    SUPPORTED_DIALECTS.join(", ")
                )),
                Error::Data(DataError::NonNumeric { .. }) => Some(
                    "store numbers in the column, or CAST the value in an aggregate query"
                        .to_string(),
                ),
                Error::Compile(CompileError::UnknownIdentifier { .. }) => {
                    Some("declare it under [[variables]] or [bindings.<name>]".to_string())
                }
                _ => None,
            };
            let plain = PlainError::new(other.to_string());
            Report::new(match help {
                Some(help) => plain.with_help(help),
                None => plain,
            })
        }
    }
}

/// Convert an error raised while reading `content` from `path`.
///
/// TOML syntax errors point at their location in the file.
#[must_use]
pub fn report_in_file(err: Error, path: &Path, content: &str) -> Report {
    match err {
        Error::Config(ConfigError::Parse(e)) => {
            let span = e.span().unwrap_or(0..0);
            Report::new(FileError {
                message: format!("failed to parse {}: {}", path.display(), e.message()),
                src: NamedSource::new(path.display().to_string(), content.to_string()),
                span: (span.start, span.end.saturating_sub(span.start)).into(),
                help: None,
            })
        }
        other => report(other),
    }
}

fn locate(expression: &str, error: &CompileError) -> (usize, usize, String) {
    let end = expression.len();
    match error {
        CompileError::Lex { offset, found } => {
            (*offset, found.len_utf8(), "unexpected character".into())
        }
        CompileError::Parse { position, expected } => {
            let len = usize::from(*position < end);
            (*position, len, format!("expected {expected}"))
        }
        CompileError::UnknownIdentifier { name, position } => {
            (*position, name.len(), "not a variable or data binding".into())
        }
        CompileError::NonLinearExpression { position, .. } => {
            (*position, 1, "both sides depend on variables".into())
        }
        CompileError::DivisionByZero { position } => (*position, 1, "divisor is zero".into()),
        CompileError::NonFiniteValue { position, .. } => {
            (*position, 1, "produces a non-finite value".into())
        }
        _ => (0, end, error.to_string()),
    }
}

fn help_for(error: &CompileError) -> Option<String> {
    let help = match error {
        CompileError::Lex { .. } => {
            "expressions use identifiers, numbers, + - * / ( ) and one of <=, >=, ="
        }
        CompileError::UnknownIdentifier { .. } => {
            "declare it under [[variables]] or [bindings.<name>]"
        }
        CompileError::NonLinearExpression { .. } => {
            "multiply or divide variables only by numbers or data values"
        }
        CompileError::RowMismatch { .. } => {
            "every per-row column in one expression must come from rows with the same keys"
        }
        _ => return None,
    };
    Some(help.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_linear_error_points_at_operator() {
        let error = CompileError::NonLinearExpression {
            position: 8,
            expression: "estoque * compra".into(),
        };
        let diag = ExpressionError::new("constraint 1", "estoque * compra <= 3", &error);
        assert_eq!(diag.span, SourceSpan::from((8, 1)));
        assert!(diag.help.is_some());
    }

    #[test]
    fn parse_error_at_end_has_empty_span() {
        let error = CompileError::Parse {
            position: 5,
            expected: "operand".into(),
        };
        let diag = ExpressionError::new("objective", "x + (", &error);
        assert_eq!(diag.span, SourceSpan::from((5, 0)));
        assert_eq!(diag.label, "expected operand");
    }

    #[test]
    fn unknown_identifier_spans_the_name() {
        let error = CompileError::UnknownIdentifier {
            name: "preco".into(),
            position: 4,
        };
        let diag = ExpressionError::new("objective", "x + preco", &error);
        assert_eq!(diag.span, SourceSpan::from((4, 5)));
    }

    #[test]
    fn statement_errors_become_expression_diagnostics() {
        let report = report(Error::Statement {
            label: "objective".into(),
            expression: "x / 0".into(),
            source: CompileError::DivisionByZero { position: 2 },
        });
        assert!(report.downcast_ref::<ExpressionError>().is_some());
    }

    #[test]
    fn unsupported_dialect_lists_the_supported_ones() {
        let report = report(Error::Data(DataError::UnsupportedDialect {
            dialect: "postgres".into(),
        }));
        let diag = report.downcast_ref::<PlainError>().unwrap();
        assert_eq!(diag.help.as_deref(), Some("supported dialects: sqlite"));
    }

    #[test]
    fn toml_errors_point_into_the_file() {
        let content = "[solver\nbackend = 1";
        let err: Error = ConfigError::Parse(toml::from_str::<toml::Table>(content).unwrap_err()).into();
        let report = report_in_file(err, Path::new("datasolver.toml"), content);
        let diag = report.downcast_ref::<FileError>().unwrap();
        assert!(diag.message.starts_with("failed to parse datasolver.toml"));
    }
}
