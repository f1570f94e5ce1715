//! # Inbound Ports
//!
//! API trait defining what the Relay Dispatcher can do.

use async_trait::async_trait;
use cs_03_deployment_orchestrator::DeploymentManagerContext;
use shared_types::NetworkId;

use crate::domain::{GovernanceMessage, RelayAttempt, RelayError, RelayReceipt};

/// Relay API - inbound port.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Relay every pending message from `primary` to `satellite`, in nonce
    /// order.
    ///
    /// Fails with `UnsupportedRelayTarget` before touching either chain when
    /// no strategy is registered for `satellite`.
    async fn relay(
        &self,
        primary: &DeploymentManagerContext,
        satellite: &DeploymentManagerContext,
    ) -> Result<RelayReceipt, RelayError>;

    /// Drive one message through package, submit and confirm.
    async fn relay_one(
        &self,
        primary: &DeploymentManagerContext,
        satellite: &DeploymentManagerContext,
        message: GovernanceMessage,
    ) -> Result<RelayAttempt, RelayError>;

    /// Relay and surface the first failed attempt as an error.
    async fn relay_message(
        &self,
        primary: &DeploymentManagerContext,
        satellite: &DeploymentManagerContext,
    ) -> Result<(), RelayError> {
        let receipt = self.relay(primary, satellite).await?;
        match receipt.first_failure() {
            Some((nonce, reason)) => Err(RelayError::RelayFailed {
                nonce,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Whether a strategy is registered for `network`.
    fn supports(&self, network: &NetworkId) -> bool;
}
