//! Polygon FxPortal Strategy
//!
//! Relays state syncs from the primary network's `StateSender` to the
//! satellite's `FxChild`.
//!
//! ```text
//! primary:   StateSender ──StateSynced(id, contractAddress, data)──→ (event log)
//! satellite: 0x…1001 ──FxChild.onStateReceive(id, data)──→ FxChild
//! ```
//!
//! State syncs are applied in id order, so delivery is ordered per
//! destination through the strategy's [`DeliveryLedger`].

use std::sync::Arc;

use async_trait::async_trait;
use cs_03_deployment_orchestrator::DeploymentManagerContext;
use serde_json::json;
use shared_types::{Address, CallRequest, ChainError, EventFilter, NetworkId, TxStatus};
use tracing::{debug, info, warn};

use crate::adapters::ConfigurableFinalityChecker;
use crate::domain::{
    BridgeSubmission, DeliveryLedger, FailureReason, GovernanceMessage, PendingReceipt,
    RelayConfig, RelayError, RelayOutcome,
};
use crate::ports::{FinalityChecker, RelayStrategy};

const BRIDGE: &str = "polygon-fx-portal";
const STATE_SENDER: &str = "stateSender";
const FX_CHILD: &str = "fxChild";
const STATE_SYNCED: &str = "StateSynced";
const ON_STATE_RECEIVE: &str = "onStateReceive";

/// System address the Polygon validators apply state syncs from.
pub fn state_syncer() -> Address {
    Address::from_low_u64(0x1001)
}

/// Relay strategy for the Polygon FxPortal bridge.
pub struct PolygonFxStrategy {
    finality: Arc<dyn FinalityChecker>,
    config: RelayConfig,
    ledger: DeliveryLedger,
}

impl PolygonFxStrategy {
    /// Create with the default finality rules plus `config` overrides.
    pub fn new(config: RelayConfig) -> Self {
        let finality = ConfigurableFinalityChecker::new().with_overrides(&config.confirmations);
        Self {
            finality: Arc::new(finality),
            config,
            ledger: DeliveryLedger::new(),
        }
    }

    /// Replace the finality rules.
    pub fn with_finality(mut self, finality: Arc<dyn FinalityChecker>) -> Self {
        self.finality = finality;
        self
    }

    /// Delivery ledger shared by every destination this strategy serves.
    pub fn ledger(&self) -> &DeliveryLedger {
        &self.ledger
    }

    fn required_contract(
        ctx: &DeploymentManagerContext,
        name: &str,
    ) -> Result<Address, RelayError> {
        ctx.contract(name)?
            .ok_or_else(|| RelayError::MissingContract {
                network: ctx.network().clone(),
                name: name.to_string(),
            })
    }

    fn discovery_error(network: &NetworkId, err: ChainError) -> RelayError {
        RelayError::Discovery {
            network: network.clone(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl RelayStrategy for PolygonFxStrategy {
    fn bridge(&self) -> &str {
        BRIDGE
    }

    fn requires_ordered_delivery(&self) -> bool {
        true
    }

    async fn pending_messages(
        &self,
        primary: &DeploymentManagerContext,
        satellite: &DeploymentManagerContext,
    ) -> Result<Vec<GovernanceMessage>, RelayError> {
        let state_sender = Self::required_contract(primary, STATE_SENDER)?;
        let fx_child = Self::required_contract(satellite, FX_CHILD)?;

        let client = primary.client();
        let head = client
            .block_number()
            .await
            .map_err(|e| Self::discovery_error(primary.network(), e))?;
        let events = client
            .get_events(&EventFilter::new(state_sender, STATE_SYNCED))
            .await
            .map_err(|e| Self::discovery_error(primary.network(), e))?;

        let mut messages = Vec::new();
        for event in events {
            if event.address_field("contractAddress") != Some(fx_child) {
                continue;
            }
            let Some(id) = event.u64_field("id") else {
                warn!("[cs-04] StateSynced in {} has no id, skipping", event.tx_hash);
                continue;
            };

            let confirmations = head.saturating_sub(event.block_number) + 1;
            if !self.finality.is_final(primary.network(), confirmations) {
                debug!(
                    nonce = id,
                    confirmations, "[cs-04] State sync not final on {} yet", primary.network()
                );
                continue;
            }
            if self.ledger.is_confirmed(satellite.network(), id) {
                continue;
            }

            messages.push(GovernanceMessage {
                origin: primary.network().clone(),
                destination: satellite.network().clone(),
                nonce: id,
                sender: None,
                payload: event.bytes_field("data").unwrap_or_default(),
                observed_block: event.block_number,
            });
        }

        messages.sort_by_key(|m| m.nonce);
        messages.dedup_by_key(|m| m.nonce);
        self.ledger
            .record_discovered(satellite.network(), messages.iter().map(|m| m.nonce));

        info!(
            "[cs-04] {} pending state syncs {} -> {}",
            messages.len(),
            primary.network(),
            satellite.network()
        );
        Ok(messages)
    }

    fn package(
        &self,
        message: &GovernanceMessage,
        satellite: &DeploymentManagerContext,
    ) -> Result<BridgeSubmission, RelayError> {
        let fx_child = Self::required_contract(satellite, FX_CHILD)?;

        Ok(BridgeSubmission {
            bridge: BRIDGE.to_string(),
            destination: satellite.network().clone(),
            nonce: message.nonce,
            call: CallRequest {
                from: Some(state_syncer()),
                to: fx_child,
                method: ON_STATE_RECEIVE.to_string(),
                args: vec![
                    json!(message.nonce),
                    json!(format!("0x{}", hex::encode(&message.payload))),
                ],
            },
        })
    }

    async fn submit(
        &self,
        satellite: &DeploymentManagerContext,
        submission: &BridgeSubmission,
    ) -> Result<PendingReceipt, FailureReason> {
        match satellite.client().send_transaction(&submission.call).await {
            Ok(tx_hash) => {
                self.ledger
                    .record_submitted(&submission.destination, submission.nonce);
                debug!(
                    nonce = submission.nonce,
                    "[cs-04] Submitted state sync to {}: {}", submission.destination, tx_hash
                );
                Ok(PendingReceipt {
                    bridge: BRIDGE.to_string(),
                    destination: submission.destination.clone(),
                    nonce: submission.nonce,
                    tx_hash,
                })
            }
            Err(err) => {
                self.ledger
                    .record_failed(&submission.destination, submission.nonce);
                warn!(
                    nonce = submission.nonce,
                    "[cs-04] Submission to {} failed: {}", submission.destination, err
                );
                Err(FailureReason::from(err))
            }
        }
    }

    async fn confirm(
        &self,
        satellite: &DeploymentManagerContext,
        receipt: &PendingReceipt,
    ) -> RelayOutcome {
        let required = self.finality.required_confirmations(&receipt.destination);
        let timeout = self.config.confirmation_timeout;

        let delivered = async {
            let tx = satellite
                .client()
                .wait_for_receipt(&receipt.tx_hash, required)
                .await
                .map_err(FailureReason::from)?;
            if let TxStatus::Reverted { reason } = tx.status {
                return Err(FailureReason::Reverted { reason });
            }

            self.ledger
                .confirm_in_order(&receipt.destination, receipt.nonce, self.config.poll_interval)
                .await
                .map_err(|e| FailureReason::Rejected {
                    reason: e.to_string(),
                })?;
            Ok(tx)
        };

        let outcome = match tokio::time::timeout(timeout, delivered).await {
            Ok(Ok(tx)) => RelayOutcome::Confirmed {
                tx_hash: tx.tx_hash,
                block_number: tx.block_number,
            },
            Ok(Err(reason)) => RelayOutcome::Failed { reason },
            Err(_) => RelayOutcome::Failed {
                reason: FailureReason::Timeout { after: timeout },
            },
        };

        if let RelayOutcome::Failed { reason } = &outcome {
            self.ledger.record_failed(&receipt.destination, receipt.nonce);
            warn!(
                nonce = receipt.nonce,
                "[cs-04] State sync to {} failed: {}", receipt.destination, reason
            );
        }
        outcome
    }
}
