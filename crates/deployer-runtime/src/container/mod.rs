//! # Deployer Container
//!
//! Holds the shared subsystem instances and builds per-network contexts.
//!
//! ```text
//! DeployerConfig ──→ FileArtifactStore   (storage.data_dir)
//!                ──→ FileConfigSource    (storage.deployments_dir)
//!                ──→ RelayDispatcher     (relay)
//! ChainClient per network ──register_client──→ context(network, deployment)
//! ```

pub mod config;

pub use config::{ConfigError, DeployerConfig, NetworkProfile, RelaySettings, StorageConfig};

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use cs_02_artifact_store::{ArtifactStore, FileArtifactStore};
use cs_03_deployment_orchestrator::{ConfigSource, DeploymentManagerContext, FileConfigSource};
use cs_04_relay_dispatcher::RelayDispatcher;
use parking_lot::RwLock;
use shared_types::{ChainClient, NetworkId};
use tracing::{info, warn};

/// Central container holding all shared subsystem instances.
pub struct DeployerContainer {
    /// Validated configuration.
    pub config: DeployerConfig,
    /// Artifact Store (Subsystem 2), shared by every network.
    pub store: Arc<dyn ArtifactStore>,
    /// Spider output.
    pub config_source: Arc<dyn ConfigSource>,
    /// Relay Dispatcher (Subsystem 4).
    pub dispatcher: Arc<RelayDispatcher>,
    clients: RwLock<HashMap<NetworkId, Arc<dyn ChainClient>>>,
}

impl DeployerContainer {
    /// Build the file-backed container described by `config`.
    pub fn new(config: DeployerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let store: Arc<dyn ArtifactStore> =
            Arc::new(FileArtifactStore::new(config.storage.data_dir.clone()));
        let config_source: Arc<dyn ConfigSource> =
            Arc::new(FileConfigSource::new(config.storage.deployments_dir.clone()));
        let dispatcher = Arc::new(RelayDispatcher::with_defaults(config.relay.relay_config()));

        info!(
            "[runtime] Container ready: data {:?}, deployments {:?}",
            config.storage.data_dir, config.storage.deployments_dir
        );

        Ok(Self {
            config,
            store,
            config_source,
            dispatcher,
            clients: RwLock::new(HashMap::new()),
        })
    }

    /// Replace the Artifact Store (dry runs keep records in memory).
    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = store;
        self
    }

    /// Register the chain client for its network, returning the one it
    /// replaces.
    pub fn register_client(&self, client: Arc<dyn ChainClient>) -> Option<Arc<dyn ChainClient>> {
        let network = client.network().clone();
        let previous = self.clients.write().insert(network.clone(), client);
        if previous.is_some() {
            warn!("[runtime] Replaced chain client for {}", network);
        }
        previous
    }

    /// Chain client of `network`.
    pub fn client(&self, network: &NetworkId) -> Option<Arc<dyn ChainClient>> {
        self.clients.read().get(network).cloned()
    }

    /// Networks with a registered client, sorted.
    pub fn networks(&self) -> Vec<NetworkId> {
        let mut networks: Vec<NetworkId> = self.clients.read().keys().cloned().collect();
        networks.sort();
        networks
    }

    /// Build a context for `deployment` on `network`.
    ///
    /// The asset registry is reloaded from Spider output on every call.
    pub fn context(&self, network: &NetworkId, deployment: &str) -> Result<DeploymentManagerContext> {
        let client = self
            .client(network)
            .with_context(|| format!("No chain client registered for {}", network))?;
        let registry = self
            .config_source
            .load_assets(network)
            .with_context(|| format!("Failed to load assets for {}", network))?;

        let ctx = DeploymentManagerContext::new(
            network.clone(),
            deployment,
            client,
            self.store.clone(),
            Arc::new(registry),
            self.config.network_settings(network),
        )?;
        Ok(ctx)
    }
}
