//! Datasolver - database-backed linear and mixed-integer optimization.
//!
//! Objectives and constraints are written as plain expression strings over
//! decision variables and named data bindings. Bindings are resolved from
//! data sources (SQLite through Diesel, or memory), expressions are compiled
//! to linear forms, and the resulting model is solved with HiGHS.
//!
//! # Architecture
//!
//! - **`domain`** - Solver-agnostic model types: variables, linear forms,
//!   constraints, data bindings, solutions
//! - **`compiler`** - Tokenizer, parser, binder, normalizer and the
//!   [`ModelBuilder`](compiler::ModelBuilder)
//! - **`port`** - Traits at the seams: [`DataSource`](port::DataSource)
//!   and [`Solver`](port::Solver)
//! - **`adapter::outbound`** - SQLite and memory data sources, the source
//!   registry, and the HiGHS solver
//! - **`adapter::inbound::cli`** - The `datasolver` command line
//! - **`infrastructure::config`** - TOML configuration and logging setup
//! - [`problem`] - Problem definition files
//!
//! # Example
//!
//! ```
//! use datasolver::adapter::outbound::solver::HighsSolver;
//! use datasolver::compiler::ModelBuilder;
//! use datasolver::domain::{DataBinding, Direction, VariableSpec};
//! use datasolver::port::{SolveOptions, Solver};
//!
//! # fn main() -> datasolver::error::Result<()> {
//! let mut builder = ModelBuilder::new();
//! builder.declare_variable(VariableSpec::new("x"))?;
//! builder.bind_value("minimo", DataBinding::Scalar(5.0))?;
//! builder.set_objective(Direction::Minimize, "x")?;
//! builder.add_constraint("x >= minimo")?;
//!
//! let solution = HighsSolver::new().solve(&builder.build()?, &SolveOptions::default());
//! assert!(solution.is_optimal());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod compiler;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
pub mod problem;
