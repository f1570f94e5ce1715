//! # Deployment Manager Context
//!
//! Everything an operation on one network needs: its identity, the chain
//! connection, the Artifact Store, the Asset Registry and per-network
//! settings. Orchestrator operations take it by `&mut`, so one context never
//! serves two concurrent deployment runs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use cs_01_asset_registry::AssetRegistry;
use cs_02_artifact_store::{ArtifactStore, DeployedSet};
use shared_types::{Address, ChainClient, NetworkId};

use crate::domain::DeployError;

/// Per-network settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkSettings {
    /// Blocks (inclusion counts as one) before a step counts as confirmed.
    pub confirmations: u64,
    /// Upper bound on each confirmation wait.
    pub confirmation_timeout: Duration,
    /// Well-known contracts not deployed by this tool (`fxChild`, `stateSender`, ...).
    pub contracts: BTreeMap<String, Address>,
}

impl NetworkSettings {
    /// Default bound on confirmation waits.
    pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

    /// Override the confirmation count.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Override the confirmation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Register a well-known contract.
    pub fn with_contract(mut self, name: impl Into<String>, address: Address) -> Self {
        self.contracts.insert(name.into(), address);
        self
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            confirmations: 1,
            confirmation_timeout: Self::DEFAULT_CONFIRMATION_TIMEOUT,
            contracts: BTreeMap::new(),
        }
    }
}

/// Per-network handle used by the orchestrator and the relay dispatcher.
pub struct DeploymentManagerContext {
    network: NetworkId,
    deployment: String,
    client: Arc<dyn ChainClient>,
    store: Arc<dyn ArtifactStore>,
    registry: Arc<dyn AssetRegistry>,
    settings: NetworkSettings,
}

impl DeploymentManagerContext {
    /// Bind a context to `network`.
    ///
    /// Fails with `NetworkMismatch` if `client` submits to another network.
    pub fn new(
        network: NetworkId,
        deployment: impl Into<String>,
        client: Arc<dyn ChainClient>,
        store: Arc<dyn ArtifactStore>,
        registry: Arc<dyn AssetRegistry>,
        settings: NetworkSettings,
    ) -> Result<Self, DeployError> {
        if client.network() != &network {
            return Err(DeployError::NetworkMismatch {
                expected: network,
                actual: client.network().clone(),
            });
        }

        Ok(Self {
            network,
            deployment: deployment.into(),
            client,
            store,
            registry,
            settings,
        })
    }

    /// Network this context is bound to.
    pub fn network(&self) -> &NetworkId {
        &self.network
    }

    /// Deployment name.
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Chain connection.
    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    /// Artifact Store.
    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Asset Registry.
    pub fn registry(&self) -> &Arc<dyn AssetRegistry> {
        &self.registry
    }

    /// Network settings.
    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    /// Address of contract `name`: the Artifact Store first, then the
    /// well-known contracts.
    pub fn contract(&self, name: &str) -> Result<Option<Address>, DeployError> {
        if let Some(artifact) = self.store.get(&self.network, name)? {
            return Ok(Some(artifact.address));
        }
        Ok(self.settings.contracts.get(name).copied())
    }

    /// Everything the store holds for this network.
    pub fn existing(&self) -> Result<DeployedSet, DeployError> {
        Ok(self.store.all(&self.network)?)
    }
}

impl std::fmt::Debug for DeploymentManagerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentManagerContext")
            .field("network", &self.network)
            .field("deployment", &self.deployment)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_01_asset_registry::StaticAssetRegistry;
    use cs_02_artifact_store::{Artifact, InMemoryArtifactStore};
    use shared_types::SimulatedChain;

    fn context(network: &str, client_network: &str) -> Result<DeploymentManagerContext, DeployError> {
        DeploymentManagerContext::new(
            NetworkId::from(network),
            "usdc",
            Arc::new(SimulatedChain::new(client_network)),
            Arc::new(InMemoryArtifactStore::new()),
            Arc::new(StaticAssetRegistry::new()),
            NetworkSettings::default().with_contract("fxChild", Address::from_low_u64(0xf0)),
        )
    }

    #[test]
    fn test_network_mismatch_rejected() {
        let err = context("polygon", "mainnet").unwrap_err();
        assert_eq!(
            err,
            DeployError::NetworkMismatch {
                expected: NetworkId::from("polygon"),
                actual: NetworkId::from("mainnet"),
            }
        );
    }

    #[test]
    fn test_contract_prefers_store() {
        let ctx = context("polygon", "polygon").unwrap();
        assert_eq!(
            ctx.contract("fxChild").unwrap(),
            Some(Address::from_low_u64(0xf0))
        );
        assert_eq!(ctx.contract("comet").unwrap(), None);

        let record = Artifact::contract(
            NetworkId::from("polygon"),
            "fxChild",
            "FxChild",
            Address::from_low_u64(0xf1),
        );
        ctx.store()
            .put(ctx.network(), "fxChild", record, false)
            .unwrap();
        assert_eq!(
            ctx.contract("fxChild").unwrap(),
            Some(Address::from_low_u64(0xf1))
        );
    }
}
