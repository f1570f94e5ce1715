//! # Outbound Ports
//!
//! Bridge strategies and finality rules.

use async_trait::async_trait;
use cs_03_deployment_orchestrator::DeploymentManagerContext;
use shared_types::NetworkId;

use crate::domain::{
    BridgeSubmission, FailureReason, GovernanceMessage, PendingReceipt, RelayError, RelayOutcome,
};

/// One bridge family's relay mechanism - outbound port.
///
/// Implementations own everything bridge-specific: message discovery,
/// packaging, the delivery guarantee and, when the bridge needs it, ordering.
#[async_trait]
pub trait RelayStrategy: Send + Sync {
    /// Bridge family name (e.g. `polygon-fx-portal`).
    fn bridge(&self) -> &str;

    /// Whether the bridge delivers strictly in nonce order.
    fn requires_ordered_delivery(&self) -> bool;

    /// Messages approved on `primary` and not yet confirmed on `satellite`.
    async fn pending_messages(
        &self,
        primary: &DeploymentManagerContext,
        satellite: &DeploymentManagerContext,
    ) -> Result<Vec<GovernanceMessage>, RelayError>;

    /// Build the satellite transaction for `message`. No chain access.
    fn package(
        &self,
        message: &GovernanceMessage,
        satellite: &DeploymentManagerContext,
    ) -> Result<BridgeSubmission, RelayError>;

    /// Send the delivery transaction.
    async fn submit(
        &self,
        satellite: &DeploymentManagerContext,
        submission: &BridgeSubmission,
    ) -> Result<PendingReceipt, FailureReason>;

    /// Wait, bounded, for the bridge's delivery guarantee.
    ///
    /// Must never return `Confirmed` before that guarantee holds.
    async fn confirm(
        &self,
        satellite: &DeploymentManagerContext,
        receipt: &PendingReceipt,
    ) -> RelayOutcome;
}

/// Confirmation depth per network - outbound port.
pub trait FinalityChecker: Send + Sync {
    /// Blocks (inclusion counts as one) before a transaction on `network`
    /// is considered final.
    fn required_confirmations(&self, network: &NetworkId) -> u64;

    /// Whether `confirmations` meets the requirement for `network`.
    fn is_final(&self, network: &NetworkId, confirmations: u64) -> bool {
        confirmations >= self.required_confirmations(network)
    }
}
