//! # Ports Module
//!
//! The registry exposes a single query port.

use shared_types::{Address, NetworkId};

use crate::domain::RegistryError;

/// Asset lookup - inbound port.
///
/// Implementations are read-only and shared across concurrent network runs.
pub trait AssetRegistry: Send + Sync {
    /// Address of the pre-existing contract for `symbol` on `network`.
    fn resolve(&self, network: &NetworkId, symbol: &str) -> Result<Address, RegistryError>;

    /// All symbols known on `network`, sorted.
    fn symbols(&self, network: &NetworkId) -> Vec<String>;

    /// Whether `symbol` resolves on `network`.
    fn contains(&self, network: &NetworkId, symbol: &str) -> bool {
        self.resolve(network, symbol).is_ok()
    }
}
