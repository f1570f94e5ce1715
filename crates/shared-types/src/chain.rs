//! # Chain Client Port
//!
//! The single outbound port through which subsystems submit transactions,
//! wait for confirmations and read events.
//!
//! ```text
//! Orchestrator (cs-03) ──deploy_contract / send_transaction──→ ChainClient
//! Relay (cs-04)        ──send_transaction / get_events──────→ ChainClient
//!                      ←──────── wait_for_receipt ──────────
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{Address, NetworkId, TxHash};
use crate::errors::ChainError;

/// Instantiate a contract with resolved constructor arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployRequest {
    /// Contract type to instantiate (e.g. `PolygonBridgeReceiver`).
    pub contract: String,
    /// Constructor arguments with every reference already resolved.
    pub args: Vec<serde_json::Value>,
}

/// Invoke a method on an existing contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Sender override. `None` uses the client's configured signer; `Some`
    /// impersonates the address (forks and system calls).
    pub from: Option<Address>,
    /// Target contract.
    pub to: Address,
    /// Method name.
    pub method: String,
    /// Resolved arguments.
    pub args: Vec<serde_json::Value>,
}

/// Final status of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxStatus {
    /// Executed successfully.
    Success,
    /// Execution reverted.
    Reverted { reason: String },
}

/// Receipt of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Block of inclusion.
    pub block_number: u64,
    /// Execution status.
    pub status: TxStatus,
    /// Address of the created contract, for deployments.
    pub contract_address: Option<Address>,
    /// Confirmations observed when the receipt was returned (inclusion counts as 1).
    pub confirmations: u64,
}

impl TransactionReceipt {
    /// Whether execution succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, TxStatus::Success)
    }
}

/// An event log emitted by a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Emitting contract.
    pub emitter: Address,
    /// Event name (e.g. `StateSynced`).
    pub name: String,
    /// Block the event was emitted in.
    pub block_number: u64,
    /// Emitting transaction.
    pub tx_hash: TxHash,
    /// Decoded event fields.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ChainEvent {
    /// Read a numeric field, accepting JSON numbers and decimal or `0x` strings.
    pub fn u64_field(&self, key: &str) -> Option<u64> {
        match self.fields.get(key)? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => match s.strip_prefix("0x") {
                Some(digits) => u64::from_str_radix(digits, 16).ok(),
                None => s.parse().ok(),
            },
            _ => None,
        }
    }

    /// Read an address field.
    pub fn address_field(&self, key: &str) -> Option<Address> {
        self.fields.get(key)?.as_str()?.parse().ok()
    }

    /// Read a `0x`-hex bytes field.
    pub fn bytes_field(&self, key: &str) -> Option<Vec<u8>> {
        let raw = self.fields.get(key)?.as_str()?;
        hex::decode(raw.strip_prefix("0x").unwrap_or(raw)).ok()
    }
}

/// Event query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events from this contract.
    pub emitter: Option<Address>,
    /// Only events with this name.
    pub name: Option<String>,
    /// Only events at or after this block.
    pub from_block: u64,
}

impl EventFilter {
    /// Filter events named `name` emitted by `emitter`.
    pub fn new(emitter: Address, name: impl Into<String>) -> Self {
        Self {
            emitter: Some(emitter),
            name: Some(name.into()),
            from_block: 0,
        }
    }

    /// Start scanning at `block`.
    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = block;
        self
    }

    /// Whether `event` satisfies this filter.
    pub fn matches(&self, event: &ChainEvent) -> bool {
        event.block_number >= self.from_block
            && self.emitter.map_or(true, |e| e == event.emitter)
            && self.name.as_deref().map_or(true, |n| n == event.name)
    }
}

/// Connection to one network - outbound port.
///
/// Implementations are bound to exactly one network and shared as
/// `Arc<dyn ChainClient>`.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Network this client submits to.
    fn network(&self) -> &NetworkId;

    /// Current head block number.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Submit a contract creation transaction.
    async fn deploy_contract(&self, request: &DeployRequest) -> Result<TxHash, ChainError>;

    /// Submit a contract call transaction.
    async fn send_transaction(&self, request: &CallRequest) -> Result<TxHash, ChainError>;

    /// Wait until `tx_hash` is included with at least `confirmations` blocks
    /// (inclusion counts as one). Does not time out on its own.
    async fn wait_for_receipt(
        &self,
        tx_hash: &TxHash,
        confirmations: u64,
    ) -> Result<TransactionReceipt, ChainError>;

    /// Read event logs.
    async fn get_events(&self, filter: &EventFilter) -> Result<Vec<ChainEvent>, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_event(fields: serde_json::Value) -> ChainEvent {
        ChainEvent {
            emitter: Address::from_low_u64(1),
            name: "StateSynced".to_string(),
            block_number: 10,
            tx_hash: TxHash::ZERO,
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_event_u64_field_formats() {
        let event = make_event(json!({ "a": 7, "b": "8", "c": "0x10" }));
        assert_eq!(event.u64_field("a"), Some(7));
        assert_eq!(event.u64_field("b"), Some(8));
        assert_eq!(event.u64_field("c"), Some(16));
        assert_eq!(event.u64_field("missing"), None);
    }

    #[test]
    fn test_event_bytes_and_address_fields() {
        let event = make_event(json!({
            "data": "0xdeadbeef",
            "contractAddress": "0x0000000000000000000000000000000000001001"
        }));
        assert_eq!(event.bytes_field("data"), Some(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(
            event.address_field("contractAddress"),
            Some(Address::from_low_u64(0x1001))
        );
    }

    #[test]
    fn test_event_filter_matches() {
        let event = make_event(json!({}));
        let filter = EventFilter::new(Address::from_low_u64(1), "StateSynced");
        assert!(filter.matches(&event));
        assert!(!filter.clone().from_block(11).matches(&event));
        assert!(!EventFilter::new(Address::from_low_u64(2), "StateSynced").matches(&event));
        assert!(EventFilter::default().matches(&event));
    }
}
