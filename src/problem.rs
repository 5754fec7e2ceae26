//! Problem definition files.
//!
//! A problem file declares variables, data bindings, the objective and the
//! constraints of one model in TOML:
//!
//! ```toml
//! constraints = ["estoque >= previsao_venda", "estoque <= capacidade"]
//!
//! [[variables]]
//! name = "estoque"
//! upper = 500
//! domain = "integer"
//!
//! [bindings.previsao_venda]
//! source = "vendas"
//! table = "produtos"
//! column = "previsao"
//! key = "sku"
//!
//! [bindings.capacidade]
//! source = "vendas"
//! sql = "SELECT MAX(capacidade) FROM depositos"
//!
//! [objective]
//! direction = "minimize"
//! expression = "estoque * custo_unitario"
//! ```
//!
//! `constraints` is a top-level key, so it must come before the first table.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::adapter::outbound::registry::DataSources;
use crate::compiler::ModelBuilder;
use crate::domain::{DataBinding, DataQuery, Direction, Model, VariableDomain, VariableSpec};
use crate::error::{ConfigError, Error, Result};

/// A parsed problem file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemFile {
    #[serde(default)]
    pub variables: Vec<VariableEntry>,

    #[serde(default)]
    pub bindings: BTreeMap<String, BindingEntry>,

    pub objective: ObjectiveEntry,

    #[serde(default)]
    pub constraints: Vec<String>,
}

/// One `[[variables]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableEntry {
    pub name: String,
    /// `-inf` declares a variable without lower bound.
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    #[serde(default)]
    pub domain: VariableDomain,
    /// Per-row binding to declare one variable per row over.
    pub over: Option<String>,
}

impl VariableEntry {
    fn spec(&self) -> VariableSpec {
        let mut spec = VariableSpec::new(self.name.clone()).domain(self.domain);
        if let Some(lower) = self.lower {
            spec = spec.lower((lower != f64::NEG_INFINITY).then_some(lower));
        }
        if let Some(upper) = self.upper {
            spec = spec.upper((upper != f64::INFINITY).then_some(upper));
        }
        spec
    }
}

/// One `[bindings.<name>]` entry: a column, an aggregate, or a literal value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingEntry {
    /// Database name from the configuration.
    pub source: Option<String>,
    pub table: Option<String>,
    pub column: Option<String>,
    pub key: Option<String>,
    pub sql: Option<String>,
    pub value: Option<f64>,
}

/// Where a binding's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind<'a> {
    Value(f64),
    Query { source: &'a str, query: DataQuery },
}

impl BindingEntry {
    /// Classify the entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] unless exactly one of `value`,
    /// `sql` or `table` + `column` is given, with a `source` for the latter
    /// two.
    pub fn kind(&self, name: &str) -> std::result::Result<BindingKind<'_>, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            field: "bindings",
            reason: format!("'{name}': {reason}"),
        };

        match (self.value, &self.sql, &self.table, &self.column) {
            (Some(value), None, None, None) => {
                if self.source.is_some() || self.key.is_some() {
                    return Err(invalid("a literal value takes no source or key"));
                }
                Ok(BindingKind::Value(value))
            }
            (None, Some(sql), None, None) => {
                if self.key.is_some() {
                    return Err(invalid("an aggregate query takes no key"));
                }
                let source = self
                    .source
                    .as_deref()
                    .ok_or_else(|| invalid("missing 'source'"))?;
                Ok(BindingKind::Query {
                    source,
                    query: DataQuery::aggregate(sql.clone()),
                })
            }
            (None, None, Some(table), Some(column)) => {
                let source = self
                    .source
                    .as_deref()
                    .ok_or_else(|| invalid("missing 'source'"))?;
                Ok(BindingKind::Query {
                    source,
                    query: DataQuery::Column {
                        table: table.clone(),
                        column: column.clone(),
                        key: self.key.clone(),
                    },
                })
            }
            _ => Err(invalid(
                "expected exactly one of 'value', 'sql', or 'table' with 'column'",
            )),
        }
    }
}

/// The `[objective]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectiveEntry {
    pub direction: Direction,
    pub expression: String,
}

impl ProblemFile {
    /// Parse a problem from TOML content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Parse)?)
    }

    /// Load a problem file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFile`] if the file cannot be read, and any
    /// error from [`parse_toml`](Self::parse_toml).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Feed the whole problem into a fresh builder.
    ///
    /// Bindings are registered first, then variables (families need their
    /// binding), the objective, and the constraints in file order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Statement`] for an objective or constraint that does
    /// not compile, and the builder's or registry's error for anything else.
    pub fn builder(&self, sources: &DataSources) -> Result<ModelBuilder> {
        let mut builder = ModelBuilder::new();

        for (name, entry) in &self.bindings {
            match entry.kind(name)? {
                BindingKind::Value(value) => {
                    builder.bind_value(name.clone(), DataBinding::Scalar(value))?;
                }
                BindingKind::Query { source, query } => {
                    builder.bind_data(name.clone(), sources.get(source)?, query)?;
                }
            }
        }

        for entry in &self.variables {
            match &entry.over {
                Some(over) => {
                    builder.declare_family(entry.spec(), over)?;
                }
                None => {
                    builder.declare_variable(entry.spec())?;
                }
            }
        }

        builder
            .set_objective(self.objective.direction, &self.objective.expression)
            .map_err(|e| statement_error(e, "objective".to_string(), &self.objective.expression))?;

        for (index, expression) in self.constraints.iter().enumerate() {
            builder
                .add_constraint(expression)
                .map_err(|e| statement_error(e, format!("constraint {}", index + 1), expression))?;
        }

        tracing::debug!(
            component = "problem",
            variables = self.variables.len(),
            bindings = self.bindings.len(),
            constraints = self.constraints.len(),
            "Loaded problem"
        );
        Ok(builder)
    }

    /// Compile the problem into a [`Model`].
    ///
    /// # Errors
    ///
    /// See [`builder`](Self::builder) and [`ModelBuilder::build`].
    pub fn compile(&self, sources: &DataSources) -> Result<Model> {
        self.builder(sources)?.build()
    }
}

fn statement_error(err: Error, label: String, expression: &str) -> Error {
    match err {
        Error::Compile(source) => Error::Statement {
            label,
            expression: expression.to_string(),
            source,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemorySource;
    use crate::domain::{DataRow, VariableBounds, VariableId};
    use crate::error::CompileError;
    use std::sync::Arc;

    fn sources() -> DataSources {
        let mut sources = DataSources::new();
        let memory = MemorySource::new("vendas").with_table(
            "produtos",
            vec![
                DataRow::new("a").with("previsao", 3.0).with("custo", 2.0),
                DataRow::new("b").with("previsao", 8.0).with("custo", 1.0),
            ],
        );
        sources.add("vendas", Arc::new(memory)).unwrap();
        sources
    }

    const PROBLEM: &str = r#"
constraints = ["compra >= previsao", "estoque >= previsao"]

[[variables]]
name = "estoque"
upper = 100

[[variables]]
name = "compra"
domain = "integer"
over = "previsao"

[bindings.previsao]
source = "vendas"
table = "produtos"
column = "previsao"
key = "sku"

[bindings.custo]
source = "vendas"
table = "produtos"
column = "custo"
key = "sku"

[bindings.margem]
value = 0.5

[objective]
direction = "minimize"
expression = "custo * compra + margem * estoque"
"#;

    #[test]
    fn compiles_a_full_problem() {
        let problem = ProblemFile::parse_toml(PROBLEM).unwrap();
        let model = problem.compile(&sources()).unwrap();

        assert_eq!(model.variables().len(), 3);
        assert_eq!(model.constraints().len(), 4);
        let objective = &model.objective().form;
        assert_eq!(objective.coefficient(&VariableId::new("compra[a]")), 2.0);
        assert_eq!(objective.coefficient(&VariableId::new("compra[b]")), 1.0);
        // margem * estoque is counted once per row of the objective.
        assert_eq!(objective.coefficient(&VariableId::new("estoque")), 1.0);
    }

    #[test]
    fn negative_infinity_lower_bound_means_free() {
        let entry = VariableEntry {
            name: "saldo".into(),
            lower: Some(f64::NEG_INFINITY),
            upper: None,
            domain: VariableDomain::Continuous,
            over: None,
        };
        assert_eq!(entry.spec().bounds.lower, None);
    }

    #[test]
    fn binary_variable_rejects_bound_above_one() {
        let problem = ProblemFile::parse_toml(
            r#"
[[variables]]
name = "abre"
domain = "binary"
upper = 10

[objective]
direction = "maximize"
expression = "abre"
"#,
        )
        .unwrap();
        let err = problem.compile(&DataSources::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Compile(CompileError::InvalidBounds { upper, .. }) if upper == 10.0
        ));
    }

    #[test]
    fn binary_variable_keeps_unit_bounds() {
        let entry = VariableEntry {
            name: "abre".into(),
            lower: None,
            upper: Some(1.0),
            domain: VariableDomain::Binary,
            over: None,
        };
        assert_eq!(entry.spec().bounds, VariableBounds::binary());
    }

    #[test]
    fn statement_errors_carry_expression() {
        let mut problem = ProblemFile::parse_toml(PROBLEM).unwrap();
        problem.constraints.push("estoque * compra <= 3".into());
        let err = problem.compile(&sources()).unwrap_err();
        match err {
            Error::Statement {
                label,
                expression,
                source,
            } => {
                assert_eq!(label, "constraint 3");
                assert_eq!(expression, "estoque * compra <= 3");
                assert!(matches!(source, CompileError::NonLinearExpression { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_source_is_reported() {
        let problem = ProblemFile::parse_toml(PROBLEM).unwrap();
        let err = problem.compile(&DataSources::new()).unwrap_err();
        assert_eq!(err.to_string(), "data source 'vendas' not found");
    }

    #[test]
    fn binding_needs_exactly_one_kind() {
        let entry = BindingEntry {
            source: Some("vendas".into()),
            table: Some("produtos".into()),
            column: None,
            key: None,
            sql: Some("SELECT 1".into()),
            value: None,
        };
        assert!(entry.kind("x").is_err());

        let entry = BindingEntry {
            source: None,
            table: None,
            column: None,
            key: None,
            sql: Some("SELECT 1".into()),
            value: None,
        };
        let err = entry.kind("x").unwrap_err();
        assert!(err.to_string().contains("missing 'source'"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ProblemFile::parse_toml(
            "[objective]\ndirection = \"minimize\"\nexpression = \"x\"\nsense = \"min\"",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }
}
