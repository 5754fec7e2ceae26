//! Infrastructure layer.
//!
//! Provides technical concerns that support the compiler without containing
//! modelling logic: configuration loading and logging setup.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation

pub mod config;
