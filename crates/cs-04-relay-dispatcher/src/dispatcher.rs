//! # Relay Dispatcher
//!
//! Maps satellite networks to bridge strategies and drives each pending
//! message through the relay state machine.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cs_03_deployment_orchestrator::DeploymentManagerContext;
use parking_lot::RwLock;
use shared_types::NetworkId;
use tracing::{info, warn};

use crate::adapters::PolygonFxStrategy;
use crate::domain::{
    GovernanceMessage, RelayAttempt, RelayConfig, RelayError, RelayReceipt, RelayState,
};
use crate::ports::{RelayApi, RelayStrategy};

/// Open registry of relay strategies, keyed by satellite network.
#[derive(Default)]
pub struct RelayDispatcher {
    strategies: RwLock<HashMap<NetworkId, Arc<dyn RelayStrategy>>>,
}

impl RelayDispatcher {
    /// Create a dispatcher with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in strategies: Polygon FxPortal for `polygon` and
    /// `mumbai`.
    pub fn with_defaults(config: RelayConfig) -> Self {
        let dispatcher = Self::new();
        let polygon: Arc<dyn RelayStrategy> = Arc::new(PolygonFxStrategy::new(config));
        dispatcher.register("polygon", polygon.clone());
        dispatcher.register("mumbai", polygon);
        dispatcher
    }

    /// Register `strategy` for `network`, returning the one it replaces.
    pub fn register(
        &self,
        network: impl Into<NetworkId>,
        strategy: Arc<dyn RelayStrategy>,
    ) -> Option<Arc<dyn RelayStrategy>> {
        let network = network.into();
        let bridge = strategy.bridge().to_string();
        let previous = self.strategies.write().insert(network.clone(), strategy);
        match &previous {
            Some(old) => warn!(
                "[cs-04] Replaced {} relay for {} with {}",
                old.bridge(),
                network,
                bridge
            ),
            None => info!("[cs-04] Registered {} relay for {}", bridge, network),
        }
        previous
    }

    /// Networks with a registered strategy, sorted.
    pub fn registered_networks(&self) -> Vec<NetworkId> {
        let mut networks: Vec<NetworkId> = self.strategies.read().keys().cloned().collect();
        networks.sort();
        networks
    }

    fn strategy_for(
        &self,
        primary: &DeploymentManagerContext,
        satellite: &DeploymentManagerContext,
    ) -> Result<Arc<dyn RelayStrategy>, RelayError> {
        self.strategies
            .read()
            .get(satellite.network())
            .cloned()
            .ok_or_else(|| RelayError::UnsupportedRelayTarget {
                satellite: satellite.network().clone(),
                primary: primary.network().clone(),
            })
    }

    async fn drive(
        strategy: &dyn RelayStrategy,
        satellite: &DeploymentManagerContext,
        message: GovernanceMessage,
    ) -> Result<RelayAttempt, RelayError> {
        if &message.destination != satellite.network() {
            return Err(RelayError::DestinationMismatch {
                nonce: message.nonce,
                destination: message.destination,
                satellite: satellite.network().clone(),
            });
        }

        let submission = strategy.package(&message, satellite)?;
        let mut attempt = RelayAttempt::packaged(message, strategy.bridge());

        match strategy.submit(satellite, &submission).await {
            Ok(receipt) => {
                attempt.submitted(receipt.clone())?;
                let outcome = strategy.confirm(satellite, &receipt).await;
                attempt.resolve(outcome)?;
            }
            Err(reason) => attempt.fail(reason)?,
        }

        match attempt.failure() {
            Some(reason) => warn!(
                nonce = attempt.nonce(),
                bridge = %attempt.bridge,
                "[cs-04] Relay to {} failed: {}", satellite.network(), reason
            ),
            None => info!(
                nonce = attempt.nonce(),
                bridge = %attempt.bridge,
                "[cs-04] Relay to {} confirmed", satellite.network()
            ),
        }
        Ok(attempt)
    }
}

#[async_trait]
impl RelayApi for RelayDispatcher {
    async fn relay(
        &self,
        primary: &DeploymentManagerContext,
        satellite: &DeploymentManagerContext,
    ) -> Result<RelayReceipt, RelayError> {
        let strategy = self.strategy_for(primary, satellite)?;

        let mut pending = strategy.pending_messages(primary, satellite).await?;
        pending.sort_by_key(|m| m.nonce);

        let mut attempts = Vec::with_capacity(pending.len());
        for message in pending {
            let attempt = Self::drive(strategy.as_ref(), satellite, message).await?;
            let failed = attempt.state == RelayState::Failed;
            attempts.push(attempt);
            if failed && strategy.requires_ordered_delivery() {
                warn!(
                    "[cs-04] Stopping {} relay to {} at first failure",
                    strategy.bridge(),
                    satellite.network()
                );
                break;
            }
        }

        Ok(RelayReceipt {
            primary: primary.network().clone(),
            satellite: satellite.network().clone(),
            bridge: strategy.bridge().to_string(),
            attempts,
        })
    }

    async fn relay_one(
        &self,
        primary: &DeploymentManagerContext,
        satellite: &DeploymentManagerContext,
        message: GovernanceMessage,
    ) -> Result<RelayAttempt, RelayError> {
        let strategy = self.strategy_for(primary, satellite)?;
        Self::drive(strategy.as_ref(), satellite, message).await
    }

    fn supports(&self, network: &NetworkId) -> bool {
        self.strategies.read().contains_key(network)
    }
}
