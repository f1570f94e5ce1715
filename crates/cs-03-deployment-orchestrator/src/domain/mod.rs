//! # Domain Module
//!
//! - `spec`: the declarative input
//! - `plan`: the validated, ordered steps
//! - `deployed`: the result of a run
//! - `errors`: `DeployError`, `FailureCause`

pub mod deployed;
pub mod errors;
pub mod plan;
pub mod spec;

pub use deployed::*;
pub use errors::*;
pub use plan::*;
pub use spec::*;
