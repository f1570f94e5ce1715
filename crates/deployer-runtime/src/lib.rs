//! # Deployer Runtime Library
//!
//! Wires the subsystems into one process. The binary in `main.rs` drives it
//! from the environment; the integration tests drive it directly.
//!
//! ## Structure
//!
//! - `container/` - configuration and the shared subsystem instances
//! - `runtime.rs` - plan, deploy and relay operations with metrics and run ids

#![warn(missing_docs)]

pub mod container;
pub mod runtime;

pub use container::{
    ConfigError, DeployerConfig, DeployerContainer, NetworkProfile, RelaySettings, StorageConfig,
};
pub use runtime::DeployerRuntime;
