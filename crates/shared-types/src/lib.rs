//! # Shared Types Crate
//!
//! Chain-facing primitives shared by every subsystem of the deployer.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `NetworkId`, `Address` and `TxHash` are defined
//!   once here and used by the registry, the artifact store, the orchestrator
//!   and the relay dispatcher.
//! - **One Chain Port**: every on-chain interaction goes through the
//!   [`ChainClient`] trait. Subsystems never talk to a node directly.
//! - **Deterministic Simulation**: [`SimulatedChain`] implements the port in
//!   memory for dry runs and tests.

pub mod chain;
pub mod entities;
pub mod errors;
pub mod simulated;

pub use chain::*;
pub use entities::*;
pub use errors::*;
pub use simulated::SimulatedChain;
