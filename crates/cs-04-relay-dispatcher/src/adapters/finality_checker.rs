//! Finality Checker Adapter
//!
//! Implements `FinalityChecker` with per-network confirmation depths.

use std::collections::HashMap;

use shared_types::NetworkId;
use tracing::debug;

use crate::ports::FinalityChecker;

/// Confirmations for networks with no default and no override.
const FALLBACK_CONFIRMATIONS: u64 = 1;

fn default_confirmations(network: &NetworkId) -> u64 {
    match network.as_str() {
        "polygon" => 128,
        "mumbai" => 32,
        "mainnet" | "goerli" => 12,
        _ => FALLBACK_CONFIRMATIONS,
    }
}

/// Configurable finality checker.
#[derive(Clone, Debug, Default)]
pub struct ConfigurableFinalityChecker {
    /// Overrides of the per-network defaults.
    custom_confirmations: HashMap<NetworkId, u64>,
}

impl ConfigurableFinalityChecker {
    /// Create with default network confirmations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the requirement for a network.
    pub fn with_custom(mut self, network: impl Into<NetworkId>, confirmations: u64) -> Self {
        self.custom_confirmations
            .insert(network.into(), confirmations);
        self
    }

    /// Apply every override in `overrides`.
    pub fn with_overrides<'a>(
        self,
        overrides: impl IntoIterator<Item = (&'a NetworkId, &'a u64)>,
    ) -> Self {
        overrides
            .into_iter()
            .fold(self, |checker, (network, n)| checker.with_custom(network.clone(), *n))
    }

    /// Single-confirmation requirements for the known networks.
    pub fn for_testing() -> Self {
        Self::new()
            .with_custom("polygon", 1)
            .with_custom("mumbai", 1)
            .with_custom("mainnet", 1)
            .with_custom("goerli", 1)
    }
}

impl FinalityChecker for ConfigurableFinalityChecker {
    fn required_confirmations(&self, network: &NetworkId) -> u64 {
        let required = self
            .custom_confirmations
            .get(network)
            .copied()
            .unwrap_or_else(|| default_confirmations(network));
        debug!("[cs-04] {} requires {} confirmations", network, required);
        required
    }
}
