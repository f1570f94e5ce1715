//! # Domain Module
//!
//! Artifact records and the write rules every store adapter enforces.

pub mod entities;
pub mod errors;
pub mod rules;

pub use entities::*;
pub use errors::*;
pub use rules::check_write;
