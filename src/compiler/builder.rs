//! Model builder.
//!
//! Accumulates variables, data bindings, one objective and constraints.
//! Every expression is compiled completely before it is admitted, so a
//! failing call leaves the builder as it was.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::binder::{bind_expr, Family, Scope, Symbol};
use super::normalize::{normalize_constraints, normalize_objective};
use super::parser::{constraint_expr, objective_expr};
use crate::domain::{
    Constraint, DataBinding, DataQuery, Direction, Model, Objective, Variable, VariableDomain,
    VariableId, VariableSpec,
};
use crate::error::{CompileError, Result};
use crate::port::DataSource;

enum BindingSlot {
    Pending {
        source: Arc<dyn DataSource>,
        query: DataQuery,
    },
    Ready(DataBinding),
}

/// Incrementally builds a [`Model`] from expression strings.
///
/// # Example
///
/// ```
/// use datasolver::compiler::ModelBuilder;
/// use datasolver::domain::{DataBinding, Direction, VariableSpec};
///
/// # fn main() -> datasolver::error::Result<()> {
/// let mut builder = ModelBuilder::new();
/// builder.declare_variable(VariableSpec::new("estoque"))?;
/// builder.bind_value("previsao_venda", DataBinding::series([("a", 3.0), ("b", 5.0)]))?;
/// builder.set_objective(Direction::Minimize, "estoque")?;
/// builder.add_constraint("estoque >= previsao_venda")?;
///
/// let model = builder.build()?;
/// assert_eq!(model.constraints().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ModelBuilder {
    variables: Vec<Variable>,
    registered: HashSet<VariableId>,
    symbols: HashMap<String, Symbol>,
    bindings: HashMap<String, BindingSlot>,
    objective: Option<Objective>,
    constraints: Vec<Constraint>,
    statements: usize,
}

impl ModelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a single decision variable.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::DuplicateVariable`] if the name is taken and
    /// [`CompileError::InvalidBounds`] if lower exceeds upper, or if a binary
    /// variable has a bound outside [0, 1].
    pub fn declare_variable(&mut self, spec: VariableSpec) -> Result<VariableId> {
        self.check_declaration(&spec)?;
        let id = VariableId::new(spec.name.clone());
        if self.registered.contains(&id) {
            return Err(CompileError::DuplicateVariable { name: spec.name }.into());
        }

        self.register(Variable::from_spec(id.clone(), &spec));
        self.symbols
            .insert(spec.name.clone(), Symbol::Variable(id.clone()));

        tracing::debug!(
            component = "builder",
            operation = "declare_variable",
            variable = %id,
            lower = ?spec.bounds.lower,
            upper = ?spec.bounds.upper,
            domain = ?spec.domain,
            "Declared variable"
        );
        Ok(id)
    }

    /// Declare one variable per row of the per-row binding `over`.
    ///
    /// Members are named `name[row_key]` and share the declaration's bounds
    /// and domain. Inside expressions, `name` refers to the current row's
    /// member.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::DuplicateVariable`] if the name or any member
    /// is taken, [`CompileError::UnknownIdentifier`] if `over` is not bound,
    /// [`CompileError::NotASeries`] if it is a scalar, and any data error from
    /// fetching it.
    pub fn declare_family(&mut self, spec: VariableSpec, over: &str) -> Result<Vec<VariableId>> {
        self.check_declaration(&spec)?;

        let binding = self
            .fetch(over)?
            .ok_or_else(|| CompileError::UnknownIdentifier {
                name: over.to_string(),
                position: 0,
            })?;
        let series = binding.as_series().ok_or_else(|| CompileError::NotASeries {
            name: over.to_string(),
        })?;

        let family = Family {
            name: spec.name.clone(),
            keys: series.keys().cloned().collect(),
        };
        let members: Vec<VariableId> = family.members().collect();
        let mut seen = HashSet::new();
        if let Some(taken) = members
            .iter()
            .find(|id| self.registered.contains(*id) || !seen.insert(*id))
        {
            return Err(CompileError::DuplicateVariable {
                name: taken.to_string(),
            }
            .into());
        }

        for id in &members {
            self.register(Variable::from_spec(id.clone(), &spec));
        }
        self.symbols
            .insert(spec.name.clone(), Symbol::Family(Arc::new(family)));

        tracing::debug!(
            component = "builder",
            operation = "declare_family",
            family = %spec.name,
            over = over,
            members = members.len(),
            "Declared variable family"
        );
        Ok(members)
    }

    /// Bind an identifier to a query answered by `source`.
    ///
    /// The query runs the first time an expression (or a family
    /// declaration) uses the identifier, and its result is reused afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::DuplicateBinding`] if the name is already bound.
    pub fn bind_data(
        &mut self,
        name: impl Into<String>,
        source: Arc<dyn DataSource>,
        query: DataQuery,
    ) -> Result<()> {
        self.insert_binding(name.into(), BindingSlot::Pending { source, query })
    }

    /// Bind an identifier to an already-resolved value.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::DuplicateBinding`] if the name is already bound.
    pub fn bind_value(&mut self, name: impl Into<String>, binding: DataBinding) -> Result<()> {
        self.insert_binding(name.into(), BindingSlot::Ready(binding))
    }

    /// Set the objective.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ObjectiveAlreadySet`] on a second call, and
    /// any compilation or data error for the expression.
    pub fn set_objective(&mut self, direction: Direction, expression: &str) -> Result<()> {
        if self.objective.is_some() {
            return Err(CompileError::ObjectiveAlreadySet.into());
        }

        let expr = objective_expr(expression)?;
        let mut names = Vec::new();
        expr.for_each_ident(&mut |name, _| names.push(name.to_string()));
        self.fetch_all(names)?;

        let bound = bind_expr(&expr, &*self)?;
        let form = normalize_objective(&bound, expression)?;

        tracing::debug!(
            component = "builder",
            operation = "set_objective",
            direction = ?direction,
            terms = form.len(),
            "Set objective"
        );
        self.objective = Some(Objective {
            direction,
            form,
            source: expression.to_string(),
        });
        Ok(())
    }

    /// Add a constraint; per-row expressions add one constraint per row.
    ///
    /// Returns how many constraints were added.
    ///
    /// # Errors
    ///
    /// Returns any compilation or data error for the expression.
    pub fn add_constraint(&mut self, expression: &str) -> Result<usize> {
        let constraint = constraint_expr(expression)?;
        let mut names = Vec::new();
        constraint.for_each_ident(&mut |name, _| names.push(name.to_string()));
        self.fetch_all(names)?;

        let lhs = bind_expr(&constraint.lhs, &*self)?;
        let rhs = bind_expr(&constraint.rhs, &*self)?;
        let normalized = normalize_constraints(&lhs, constraint.comparator, &rhs, expression)?;

        let index = self.statements;
        self.statements += 1;
        let added = normalized.len();
        if added == 0 {
            tracing::warn!(
                component = "builder",
                expression = expression,
                "Constraint expands over zero rows"
            );
        }

        for item in normalized {
            let name = match &item.row {
                Some(key) => format!("c{index}[{key}]"),
                None => format!("c{index}"),
            };
            let constraint = Constraint {
                name,
                lhs: item.lhs,
                comparator: item.comparator,
                rhs: item.rhs,
                source: expression.to_string(),
            };
            if constraint.is_trivial() {
                tracing::warn!(
                    component = "builder",
                    constraint = %constraint,
                    "Constraint has no variable terms"
                );
            } else {
                tracing::debug!(
                    component = "builder",
                    operation = "add_constraint",
                    constraint = %constraint,
                    "Added constraint"
                );
            }
            self.constraints.push(constraint);
        }
        Ok(added)
    }

    /// Freeze the accumulated state into a [`Model`].
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::EmptyModel`] when no variable was declared and
    /// [`CompileError::NoObjective`] when no objective was set.
    pub fn build(&self) -> Result<Model> {
        if self.variables.is_empty() {
            return Err(CompileError::EmptyModel.into());
        }
        let objective = self.objective.clone().ok_or(CompileError::NoObjective)?;

        tracing::info!(
            component = "builder",
            operation = "build",
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            "Built model"
        );
        Ok(Model::new(
            self.variables.clone(),
            objective,
            self.constraints.clone(),
        ))
    }

    /// Alias for [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn compile(&self) -> Result<Model> {
        self.build()
    }

    /// Variables declared so far, in declaration order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    fn check_declaration(&self, spec: &VariableSpec) -> Result<()> {
        if self.symbols.contains_key(&spec.name) {
            return Err(CompileError::DuplicateVariable {
                name: spec.name.clone(),
            }
            .into());
        }
        let binary_out_of_range =
            spec.domain == VariableDomain::Binary && !spec.bounds.is_within_unit();
        if !spec.bounds.is_consistent() || binary_out_of_range {
            return Err(CompileError::InvalidBounds {
                name: spec.name.clone(),
                lower: spec.bounds.lower.unwrap_or(f64::NEG_INFINITY),
                upper: spec.bounds.upper.unwrap_or(f64::INFINITY),
            }
            .into());
        }
        Ok(())
    }

    fn register(&mut self, variable: Variable) {
        self.registered.insert(variable.id.clone());
        self.variables.push(variable);
    }

    fn insert_binding(&mut self, name: String, slot: BindingSlot) -> Result<()> {
        if self.bindings.contains_key(&name) {
            return Err(CompileError::DuplicateBinding { name }.into());
        }
        if self.symbols.contains_key(&name) {
            tracing::warn!(
                component = "builder",
                binding = %name,
                "Binding is shadowed by a variable of the same name"
            );
        }
        self.bindings.insert(name, slot);
        Ok(())
    }

    /// Return the binding for `name`, running its query on first use.
    fn fetch(&mut self, name: &str) -> Result<Option<DataBinding>> {
        let Some(slot) = self.bindings.get_mut(name) else {
            return Ok(None);
        };
        if let BindingSlot::Pending { source, query } = slot {
            let rows = source.query(query)?;
            let binding = DataBinding::from_rows(query, rows)?;
            tracing::debug!(
                component = "builder",
                operation = "fetch",
                binding = name,
                source = source.name(),
                rows = binding.as_series().map_or(1, |s| s.len()),
                "Fetched data binding"
            );
            *slot = BindingSlot::Ready(binding);
        }
        match slot {
            BindingSlot::Ready(binding) => Ok(Some(binding.clone())),
            BindingSlot::Pending { .. } => Ok(None),
        }
    }

    /// Fetch every pending binding among `names`; declared symbols are skipped.
    fn fetch_all(&mut self, names: Vec<String>) -> Result<()> {
        for name in names {
            if !self.symbols.contains_key(&name) {
                self.fetch(&name)?;
            }
        }
        Ok(())
    }
}

impl Scope for ModelBuilder {
    fn symbol(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).cloned()
    }

    fn data(&self, name: &str) -> Option<DataBinding> {
        match self.bindings.get(name)? {
            BindingSlot::Ready(binding) => Some(binding.clone()),
            BindingSlot::Pending { .. } => None,
        }
    }
}
