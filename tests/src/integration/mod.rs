//! Integration flows.

mod deployment_flows;
mod relay_flows;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use cs_02_artifact_store::{ArtifactStore, InMemoryArtifactStore};
    use deployer_runtime::{DeployerConfig, DeployerContainer, DeployerRuntime};
    use shared_types::{ChainClient, SimulatedChain};

    /// Spider output shipped with the repository.
    pub fn shipped_deployments() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../deployments")
    }

    pub struct Harness {
        pub runtime: DeployerRuntime,
        pub store: Arc<InMemoryArtifactStore>,
        pub chains: Vec<Arc<SimulatedChain>>,
    }

    impl Harness {
        pub fn chain(&self, network: &str) -> &Arc<SimulatedChain> {
            self.chains
                .iter()
                .find(|c| c.network().as_str() == network)
                .unwrap()
        }
    }

    /// Runtime over the shipped configs with one simulated chain per network.
    pub fn harness(data_dir: &Path, networks: &[&str], tune: impl FnOnce(&mut DeployerConfig)) -> Harness {
        let mut config = DeployerConfig::default();
        config.storage.data_dir = data_dir.to_path_buf();
        config.storage.deployments_dir = shipped_deployments();
        tune(&mut config);

        let store = Arc::new(InMemoryArtifactStore::new());
        let container = DeployerContainer::new(config)
            .unwrap()
            .with_store(store.clone() as Arc<dyn ArtifactStore>);

        let chains: Vec<Arc<SimulatedChain>> = networks
            .iter()
            .map(|n| Arc::new(SimulatedChain::new(*n)))
            .collect();
        for chain in &chains {
            container.register_client(chain.clone());
        }

        Harness {
            runtime: DeployerRuntime::new(container),
            store,
            chains,
        }
    }
}
