//! # Adapters Layer
//!
//! Implementations of the `AssetRegistry` port.

mod static_registry;

pub use static_registry::StaticAssetRegistry;
