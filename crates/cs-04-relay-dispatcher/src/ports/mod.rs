//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, outbound bridge strategies).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
