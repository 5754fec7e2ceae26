//! Adapters implementing the ports in [`crate::port`], plus the CLI that
//! drives them.

pub mod inbound;
pub mod outbound;
