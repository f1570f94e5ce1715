//! Static Asset Registry Adapter
//!
//! Implements `AssetRegistry` over an in-memory table that is filled either
//! programmatically or from the Spider `assets.json` files:
//!
//! ```json
//! { "USDC": { "address": "0x2791...", "decimals": 6 } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use shared_types::{Address, NetworkId};
use tracing::{debug, info};

use crate::domain::{AssetEntry, RegistryError};
use crate::ports::AssetRegistry;

/// Per-network symbol table.
#[derive(Clone, Debug, Default)]
pub struct StaticAssetRegistry {
    networks: BTreeMap<NetworkId, BTreeMap<String, AssetEntry>>,
}

impl StaticAssetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a single asset.
    pub fn with_asset(
        mut self,
        network: impl Into<NetworkId>,
        symbol: impl Into<String>,
        address: Address,
    ) -> Self {
        self.insert(network.into(), symbol.into(), AssetEntry::new(address));
        self
    }

    /// Insert or replace one asset.
    pub fn insert(&mut self, network: NetworkId, symbol: String, entry: AssetEntry) {
        self.networks.entry(network).or_default().insert(symbol, entry);
    }

    /// Insert every asset of one network, replacing entries with the same symbol.
    pub fn insert_network(
        &mut self,
        network: NetworkId,
        entries: impl IntoIterator<Item = (String, AssetEntry)>,
    ) {
        self.networks.entry(network).or_default().extend(entries);
    }

    /// Parse one network's `assets.json` document.
    pub fn from_json_str(network: impl Into<NetworkId>, json: &str) -> Result<Self, RegistryError> {
        let network = network.into();
        let entries: BTreeMap<String, AssetEntry> =
            serde_json::from_str(json).map_err(|e| RegistryError::Parse {
                source_name: format!("{} assets", network),
                message: e.to_string(),
            })?;

        let mut registry = Self::new();
        registry.insert_network(network, entries);
        Ok(registry)
    }

    /// Load one network's `assets.json` file.
    pub fn load(network: impl Into<NetworkId>, path: &Path) -> Result<Self, RegistryError> {
        let network = network.into();
        let json = std::fs::read_to_string(path).map_err(|e| RegistryError::Parse {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })?;
        let registry = Self::from_json_str(network.clone(), &json).map_err(|e| match e {
            RegistryError::Parse { message, .. } => RegistryError::Parse {
                source_name: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        info!(
            "[cs-01] Loaded {} assets for {} from {}",
            registry.symbols(&network).len(),
            network,
            path.display()
        );
        Ok(registry)
    }

    /// Merge another registry into this one; `other` wins on conflicts.
    pub fn merge(&mut self, other: StaticAssetRegistry) {
        for (network, entries) in other.networks {
            self.insert_network(network, entries);
        }
    }

    /// Full entry for `symbol` on `network`.
    pub fn entry(&self, network: &NetworkId, symbol: &str) -> Option<&AssetEntry> {
        self.networks.get(network)?.get(symbol)
    }

    /// Networks with at least one asset.
    pub fn networks(&self) -> Vec<NetworkId> {
        self.networks.keys().cloned().collect()
    }
}

impl AssetRegistry for StaticAssetRegistry {
    fn resolve(&self, network: &NetworkId, symbol: &str) -> Result<Address, RegistryError> {
        let entry = self
            .entry(network, symbol)
            .ok_or_else(|| RegistryError::UnknownAsset {
                symbol: symbol.to_string(),
                network: network.clone(),
            })?;

        debug!("[cs-01] {} on {} -> {}", symbol, network, entry.address);
        Ok(entry.address)
    }

    fn symbols(&self, network: &NetworkId) -> Vec<String> {
        self.networks
            .get(network)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const POLYGON_ASSETS: &str = r#"{
        "USDC": { "address": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "decimals": 6 },
        "WETH": { "address": "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619" }
    }"#;

    fn polygon() -> NetworkId {
        NetworkId::from("polygon")
    }

    #[test]
    fn test_resolve_known_asset() {
        let registry = StaticAssetRegistry::from_json_str("polygon", POLYGON_ASSETS).unwrap();
        let usdc = registry.resolve(&polygon(), "USDC").unwrap();
        assert_eq!(
            usdc.to_string(),
            "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
        );
        assert_eq!(registry.entry(&polygon(), "USDC").unwrap().decimals, Some(6));
        assert_eq!(registry.entry(&polygon(), "WETH").unwrap().decimals, None);
    }

    #[test]
    fn test_unknown_symbol_fails() {
        let registry = StaticAssetRegistry::from_json_str("polygon", POLYGON_ASSETS).unwrap();
        let err = registry.resolve(&polygon(), "DAI").unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownAsset {
                symbol: "DAI".to_string(),
                network: polygon(),
            }
        );
    }

    #[test]
    fn test_symbols_are_network_scoped() {
        let registry = StaticAssetRegistry::from_json_str("polygon", POLYGON_ASSETS).unwrap();
        assert!(registry.resolve(&NetworkId::from("mumbai"), "USDC").is_err());
        assert!(registry.symbols(&NetworkId::from("mumbai")).is_empty());
        assert_eq!(registry.symbols(&polygon()), vec!["USDC", "WETH"]);
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        let registry = StaticAssetRegistry::from_json_str("polygon", POLYGON_ASSETS).unwrap();
        assert!(!registry.contains(&polygon(), "usdc"));
        assert!(registry.contains(&polygon(), "USDC"));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base =
            StaticAssetRegistry::new().with_asset("polygon", "USDC", Address::from_low_u64(1));
        let update = StaticAssetRegistry::new()
            .with_asset("polygon", "USDC", Address::from_low_u64(2))
            .with_asset("mumbai", "USDC", Address::from_low_u64(3));
        base.merge(update);

        assert_eq!(
            base.resolve(&polygon(), "USDC").unwrap(),
            Address::from_low_u64(2)
        );
        assert_eq!(base.networks().len(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(POLYGON_ASSETS.as_bytes()).unwrap();

        let registry = StaticAssetRegistry::load("polygon", file.path()).unwrap();
        assert!(registry.contains(&polygon(), "WETH"));
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = StaticAssetRegistry::load("polygon", file.path()).unwrap_err();
        match err {
            RegistryError::Parse { source_name, .. } => {
                assert_eq!(source_name, file.path().display().to_string())
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
