//! # Algorithms
//!
//! - `kahns`: deterministic topological order with cycle extraction
//! - `resolve`: parameter resolution against bound addresses and config

pub mod kahns;
pub mod resolve;

pub use kahns::{topological_order, OrderError};
pub use resolve::Bindings;
