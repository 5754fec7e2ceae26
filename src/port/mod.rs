//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The compiler and the CLI talk to the outside world only through these
//! traits; adapters under [`crate::adapter`] implement them.
//!
//! # Available Ports
//!
//! - [`DataSource`] - Answers column and aggregate queries for data bindings
//! - [`Solver`] - LP/MILP optimization backend

pub mod outbound;

pub use outbound::data::DataSource;
pub use outbound::solver::{SolveOptions, Solver};
