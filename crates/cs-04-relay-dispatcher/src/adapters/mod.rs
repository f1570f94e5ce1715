//! # Adapters Layer (Hexagonal Architecture)
//!
//! Concrete bridge strategies and finality rules.

mod finality_checker;
mod polygon;

pub use finality_checker::ConfigurableFinalityChecker;
pub use polygon::{state_syncer, PolygonFxStrategy};
