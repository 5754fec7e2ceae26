//! Outbound adapters (driven side).

pub mod memory;
pub mod registry;
pub mod solver;
pub mod sqlite;
