//! # CS-01 Asset Registry
//!
//! Resolves human-readable asset symbols (`USDC`, `WETH`, ...) to the address
//! of the pre-existing token contract on a given network.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! The registry is read-only for the deployer. It is populated by the config
//! discovery process (Spider), which writes one `assets.json` per network.
//!
//! ## Module Structure
//!
//! ```text
//! cs-01-asset-registry/
//! ├── domain/          # AssetEntry, RegistryError
//! ├── ports/           # AssetRegistry
//! └── adapters/        # StaticAssetRegistry (in-memory / assets.json)
//! ```

#![warn(missing_docs)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::StaticAssetRegistry;
pub use domain::{AssetEntry, RegistryError};
pub use ports::AssetRegistry;
