//! # Relay Messages
//!
//! ```text
//! GovernanceMessage ──package──→ BridgeSubmission ──submit──→ PendingReceipt ──confirm──→ RelayOutcome
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared_types::{Address, CallRequest, ChainError, NetworkId, TxHash};
use thiserror::Error;

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
}

fn deserialize_hex<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    hex::decode(raw.strip_prefix("0x").unwrap_or(&raw)).map_err(serde::de::Error::custom)
}

/// An action approved on the primary network that must take effect on a
/// satellite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceMessage {
    /// Primary network the message was emitted on.
    pub origin: NetworkId,
    /// Satellite network it is destined for.
    pub destination: NetworkId,
    /// Ordering token. Delivery order per destination follows it.
    pub nonce: u64,
    /// Primary-side sender (e.g. the governor timelock), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    /// Opaque bridge payload.
    #[serde(serialize_with = "serialize_hex", deserialize_with = "deserialize_hex")]
    pub payload: Vec<u8>,
    /// Primary block the message was observed in.
    pub observed_block: u64,
}

/// Bridge-specific transaction that delivers one message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeSubmission {
    /// Bridge family.
    pub bridge: String,
    /// Satellite network.
    pub destination: NetworkId,
    /// Message nonce.
    pub nonce: u64,
    /// Satellite transaction to send.
    pub call: CallRequest,
}

/// A submitted, not yet confirmed delivery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReceipt {
    /// Bridge family.
    pub bridge: String,
    /// Satellite network.
    pub destination: NetworkId,
    /// Message nonce.
    pub nonce: u64,
    /// Satellite transaction.
    pub tx_hash: TxHash,
}

/// Why a relay attempt failed.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The bridge's delivery guarantee was not met in time.
    #[error("Timeout after {after:?}")]
    Timeout {
        /// Configured bound.
        after: Duration,
    },
    /// The delivery transaction reverted.
    #[error("Reverted: {reason}")]
    Reverted {
        /// Revert reason.
        reason: String,
    },
    /// The relayer account cannot pay for delivery.
    #[error("Insufficient relay funds")]
    InsufficientFunds,
    /// Refused before inclusion, or blocked by the bridge's ordering.
    #[error("Rejected: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },
    /// Any other chain failure.
    #[error("Chain error: {reason}")]
    Chain {
        /// Underlying error.
        reason: String,
    },
}

impl From<ChainError> for FailureReason {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::InsufficientFunds { .. } => FailureReason::InsufficientFunds,
            ChainError::Rejected(reason) => FailureReason::Rejected { reason },
            other => FailureReason::Chain {
                reason: other.to_string(),
            },
        }
    }
}

/// Final result of `confirm`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RelayOutcome {
    /// Delivered with the bridge's guarantee met.
    Confirmed {
        /// Satellite transaction.
        tx_hash: TxHash,
        /// Satellite block of inclusion.
        block_number: u64,
    },
    /// Not delivered.
    Failed {
        /// Why.
        reason: FailureReason,
    },
}

impl RelayOutcome {
    /// Whether delivery is confirmed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, RelayOutcome::Confirmed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_payload_serializes_as_hex() {
        let message = GovernanceMessage {
            origin: NetworkId::from("mainnet"),
            destination: NetworkId::from("polygon"),
            nonce: 7,
            sender: None,
            payload: vec![0xde, 0xad],
            observed_block: 100,
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["payload"], "0xdead");
        assert!(value.get("sender").is_none());

        let back: GovernanceMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_chain_error_mapping() {
        let funds = ChainError::InsufficientFunds {
            network: NetworkId::from("polygon"),
            operation: "onStateReceive".to_string(),
        };
        assert_eq!(FailureReason::from(funds), FailureReason::InsufficientFunds);
        assert_eq!(
            FailureReason::from(ChainError::Rejected("nonce too low".to_string())),
            FailureReason::Rejected {
                reason: "nonce too low".to_string()
            }
        );
        assert!(matches!(
            FailureReason::from(ChainError::UnknownTransaction(TxHash::ZERO)),
            FailureReason::Chain { .. }
        ));
    }
}
