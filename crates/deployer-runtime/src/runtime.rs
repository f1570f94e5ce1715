//! # Deployer Runtime
//!
//! Runtime operations over the container: plan, deploy one or many networks,
//! relay governance messages to a satellite.

use std::sync::Arc;

use anyhow::{Context, Result};
use cs_02_artifact_store::NetworkLock;
use cs_03_deployment_orchestrator::{
    DeployError, DeployOptions, Deployed, DeploymentApi, DeploymentOrchestrator, DeploymentPlan,
    StepAction,
};
use cs_04_relay_dispatcher::{RelayApi, RelayReceipt};
use satellite_telemetry::{
    HistogramTimer, ARTIFACTS_TRACKED, DEPLOYMENT_DURATION, DEPLOYMENT_FAILURES, DEPLOYMENT_STEPS,
    RELAY_ATTEMPTS, RELAY_CONFIRMATION_WAIT,
};
use shared_types::NetworkId;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Deployment name used for governance-side and relay contexts.
const RELAY_CONTEXT: &str = "governance";

/// The runtime orchestrating deployments and relays.
#[derive(Clone)]
pub struct DeployerRuntime {
    container: Arc<crate::container::DeployerContainer>,
    orchestrator: DeploymentOrchestrator,
}

fn failure_kind(err: &DeployError) -> &'static str {
    match err {
        DeployError::UnknownAsset { .. } => "unknown_asset",
        DeployError::CyclicDependency { .. } => "cyclic_dependency",
        DeployError::DeploymentFailed { .. } => "deployment_failed",
        DeployError::Store(_) | DeployError::StoreMismatch { .. } => "store",
        DeployError::Config { .. } => "config",
        _ => "invalid_spec",
    }
}

impl DeployerRuntime {
    /// Create a runtime over `container`.
    pub fn new(container: crate::container::DeployerContainer) -> Self {
        Self {
            container: Arc::new(container),
            orchestrator: DeploymentOrchestrator::new(),
        }
    }

    /// Shared container.
    pub fn container(&self) -> &Arc<crate::container::DeployerContainer> {
        &self.container
    }

    /// Load and plan `deployment` on `network` without touching any chain.
    pub fn plan(&self, network: &NetworkId, deployment: &str) -> Result<DeploymentPlan> {
        let spec = self
            .container
            .config_source
            .load_spec(network, deployment)
            .with_context(|| format!("Failed to load {} on {}", deployment, network))?;
        Ok(self.orchestrator.plan(&spec)?)
    }

    /// Deploy `deployment` on `network`, reusing stored artifacts.
    pub async fn deploy(&self, network: &NetworkId, deployment: &str) -> Result<Deployed> {
        self.deploy_with(network, deployment, &DeployOptions::default())
            .await
    }

    /// As [`deploy`](Self::deploy), with forced redeploys.
    ///
    /// Holds the network's `NetworkLock` for the whole run.
    pub async fn deploy_with(
        &self,
        network: &NetworkId,
        deployment: &str,
        options: &DeployOptions,
    ) -> Result<Deployed> {
        let run_id = Uuid::new_v4();
        let span = info_span!("deploy", run_id = %run_id, network = %network, deployment);

        async {
            let _lock = NetworkLock::acquire(&self.container.config.storage.data_dir, network)
                .with_context(|| format!("Another run holds {}", network))?;

            let spec = self
                .container
                .config_source
                .load_spec(network, deployment)
                .with_context(|| format!("Failed to load {} on {}", deployment, network))?;
            let mut ctx = self.container.context(network, deployment)?;

            info!("[runtime] Deploying {} on {}", deployment, network);
            let result = {
                let _timer = HistogramTimer::labelled(&DEPLOYMENT_DURATION, &[network.as_str()]);
                self.orchestrator.deploy_with(&mut ctx, &spec, options).await
            };
            self.record_deployment(network, &result);

            let deployed =
                result.with_context(|| format!("Deployment {} on {} failed", deployment, network))?;
            info!(
                "[runtime] {} on {}: {} created, {} reused",
                deployment,
                network,
                deployed.created().len(),
                deployed.reused().len()
            );
            Ok(deployed)
        }
        .instrument(span)
        .await
    }

    /// Deploy several `(network, deployment)` targets concurrently.
    ///
    /// Results come back in input order. Targets sharing a network contend
    /// for its lock; the loser fails.
    pub async fn deploy_many(
        &self,
        targets: Vec<(NetworkId, String)>,
    ) -> Vec<(NetworkId, Result<Deployed>)> {
        let mut tasks = JoinSet::new();
        for (index, (network, deployment)) in targets.into_iter().enumerate() {
            let runtime = self.clone();
            tasks.spawn(async move {
                let result = runtime.deploy(&network, &deployment).await;
                (index, network, result)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => results.push(outcome),
                Err(e) => error!("[runtime] Deployment task did not complete: {}", e),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, network, result)| (network, result))
            .collect()
    }

    /// Relay pending governance messages to `satellite`.
    pub async fn relay(&self, satellite: &NetworkId) -> Result<RelayReceipt> {
        let governance = &self.container.config.governance_network;
        let run_id = Uuid::new_v4();
        let span = info_span!("relay", run_id = %run_id, primary = %governance, satellite = %satellite);

        async {
            let primary = self.container.context(governance, RELAY_CONTEXT)?;
            let target = self.container.context(satellite, RELAY_CONTEXT)?;

            let receipt = {
                let _timer =
                    HistogramTimer::labelled(&RELAY_CONFIRMATION_WAIT, &[satellite.as_str()]);
                self.container.dispatcher.relay(&primary, &target).await?
            };

            for attempt in &receipt.attempts {
                let outcome = if attempt.is_confirmed() {
                    "confirmed"
                } else {
                    "failed"
                };
                RELAY_ATTEMPTS
                    .with_label_values(&[satellite.as_str(), outcome])
                    .inc();
            }
            info!(
                "[runtime] Relay {} -> {}: {} confirmed, {} failed",
                governance,
                satellite,
                receipt.confirmed().len(),
                receipt.failed().len()
            );
            Ok(receipt)
        }
        .instrument(span)
        .await
    }

    fn record_deployment(&self, network: &NetworkId, result: &Result<Deployed, DeployError>) {
        match result {
            Ok(deployed) => {
                for (_, action) in &deployed.actions {
                    let action = match action {
                        StepAction::Created => "created",
                        StepAction::Reused => "reused",
                    };
                    DEPLOYMENT_STEPS
                        .with_label_values(&[network.as_str(), action])
                        .inc();
                }
            }
            Err(err) => DEPLOYMENT_FAILURES
                .with_label_values(&[network.as_str(), failure_kind(err)])
                .inc(),
        }

        if let Ok(stored) = self.container.store.all(network) {
            ARTIFACTS_TRACKED
                .with_label_values(&[network.as_str()])
                .set(stored.len() as i64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{DeployerConfig, DeployerContainer};
    use cs_02_artifact_store::InMemoryArtifactStore;
    use shared_types::SimulatedChain;
    use std::path::Path;

    const SPEC: &str = r#"{
        "assets": ["USDC"],
        "config": { "fxChild": "0x00000000000000000000000000000000000000f0" },
        "contracts": [
            { "name": "bridgeReceiver", "contract": "PolygonBridgeReceiver",
              "args": [{ "$config": "fxChild" }] },
            { "name": "comet", "contract": "Comet",
              "args": [{ "governor": { "$ref": "bridgeReceiver" }, "baseToken": { "$asset": "USDC" } }] }
        ]
    }"#;

    const ASSETS: &str = r#"{ "USDC": { "address": "0x00000000000000000000000000000000000000aa", "decimals": 6 } }"#;

    fn write_deployment(root: &Path, network: &str) {
        let dir = root.join(network).join("usdc");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("configuration.json"), SPEC).unwrap();
        std::fs::write(root.join(network).join("assets.json"), ASSETS).unwrap();
    }

    fn runtime(dir: &Path) -> DeployerRuntime {
        let mut config = DeployerConfig::default();
        config.storage.data_dir = dir.join("data");
        config.storage.deployments_dir = dir.join("deployments");
        write_deployment(&config.storage.deployments_dir, "polygon");
        write_deployment(&config.storage.deployments_dir, "mumbai");

        let container = DeployerContainer::new(config)
            .unwrap()
            .with_store(Arc::new(InMemoryArtifactStore::new()));
        container.register_client(Arc::new(SimulatedChain::new("polygon")));
        container.register_client(Arc::new(SimulatedChain::new("mumbai")));
        DeployerRuntime::new(container)
    }

    #[test]
    fn test_plan() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());

        let plan = runtime.plan(&NetworkId::from("polygon"), "usdc").unwrap();
        assert_eq!(plan.order(), vec!["bridgeReceiver", "comet"]);
    }

    #[tokio::test]
    async fn test_deploy_then_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());
        let polygon = NetworkId::from("polygon");

        let first = runtime.deploy(&polygon, "usdc").await.unwrap();
        assert_eq!(first.created(), vec!["bridgeReceiver", "comet"]);

        let second = runtime.deploy(&polygon, "usdc").await.unwrap();
        assert!(second.is_noop());
        assert_eq!(first.address("comet"), second.address("comet"));

        assert!(
            DEPLOYMENT_STEPS
                .with_label_values(&["polygon", "reused"])
                .get()
                >= 2.0
        );
    }

    #[tokio::test]
    async fn test_deploy_refused_while_locked() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());
        let polygon = NetworkId::from("polygon");

        let _held =
            NetworkLock::acquire(&runtime.container().config.storage.data_dir, &polygon).unwrap();
        let err = runtime.deploy(&polygon, "usdc").await.unwrap_err();
        assert!(err.to_string().contains("Another run holds polygon"));
    }

    #[tokio::test]
    async fn test_deploy_many_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());

        let results = runtime
            .deploy_many(vec![
                (NetworkId::from("polygon"), "usdc".to_string()),
                (NetworkId::from("mumbai"), "usdc".to_string()),
                (NetworkId::from("fuji"), "usdc".to_string()),
            ])
            .await;

        let networks: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(networks, vec!["polygon", "mumbai", "fuji"]);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_ok());
        // No client and no spec for fuji.
        assert!(results[2].1.is_err());
    }

    #[tokio::test]
    async fn test_relay_unsupported_satellite() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());
        runtime
            .container()
            .register_client(Arc::new(SimulatedChain::new("mainnet")));
        runtime
            .container()
            .register_client(Arc::new(SimulatedChain::new("fuji")));

        let err = runtime.relay(&NetworkId::from("fuji")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "No message relay implementation from fuji -> mainnet"
        );
    }
}
