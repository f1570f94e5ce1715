//! # Domain Module
//!
//! Core types for the Asset Registry.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
