//! # Comet Satellite Deployer
//!
//! Entry point for planning a satellite deployment or dry-running it against
//! simulated chains.
//!
//! ## Environment
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CS_MODE` | `plan` | `plan` prints the execution order, `simulate` deploys on a simulated chain |
//! | `CS_NETWORK` | `polygon` | Target network |
//! | `CS_DEPLOYMENT` | `usdc` | Deployment under `<deployments_dir>/<network>/` |
//!
//! Configuration comes from `CS_CONFIG` plus the overrides documented on
//! [`DeployerConfig::from_env`].

use std::sync::Arc;

use anyhow::{bail, Result};
use cs_02_artifact_store::InMemoryArtifactStore;
use cs_04_relay_dispatcher::RelayApi;
use deployer_runtime::{DeployerConfig, DeployerContainer, DeployerRuntime};
use satellite_telemetry::{init_telemetry, register_metrics, TelemetryConfig};
use shared_types::{NetworkId, SimulatedChain};
use tracing::info;

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_service("runtime"))?;
    register_metrics()?;

    let config = DeployerConfig::from_env()?;
    let mode = env_or("CS_MODE", "plan");
    let network = NetworkId::from(env_or("CS_NETWORK", "polygon"));
    let deployment = env_or("CS_DEPLOYMENT", "usdc");

    match mode.as_str() {
        "plan" => {
            let runtime = DeployerRuntime::new(DeployerContainer::new(config)?);
            let plan = runtime.plan(&network, &deployment)?;
            info!("[runtime] {} steps for {} on {}", plan.len(), deployment, network);
            print!("{}", plan);
        }
        "simulate" => {
            let governance = config.governance_network.clone();
            let container = DeployerContainer::new(config)?
                .with_store(Arc::new(InMemoryArtifactStore::new()));
            container.register_client(Arc::new(SimulatedChain::new(network.clone())));
            if governance != network {
                container.register_client(Arc::new(SimulatedChain::new(governance)));
            }
            let runtime = DeployerRuntime::new(container);

            let deployed = runtime.deploy(&network, &deployment).await?;
            println!("{}", serde_json::to_string_pretty(&deployed)?);

            if runtime.container().dispatcher.supports(&network) {
                let receipt = runtime.relay(&network).await?;
                info!(
                    "[runtime] Relayed {} messages to {}",
                    receipt.attempts.len(),
                    network
                );
            }
        }
        other => bail!("Unknown CS_MODE {} (expected plan or simulate)", other),
    }

    Ok(())
}
