//! Simulated Chain Adapter
//!
//! Implements the `ChainClient` port entirely in memory. Used for dry runs
//! (`CS_MODE=simulate`) and by every test in the workspace.
//!
//! Addresses and hashes are deterministic: keccak256 over the network name and
//! a per-chain nonce, so the same sequence of submissions always yields the
//! same artifacts.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::chain::{
    CallRequest, ChainClient, ChainEvent, DeployRequest, EventFilter, TransactionReceipt, TxStatus,
};
use crate::entities::{Address, NetworkId, TxHash};
use crate::errors::ChainError;

/// Block interval used while waiting for receipts when auto-mining is off.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Default)]
struct ChainState {
    head: u64,
    nonce: u64,
    auto_mine: bool,
    receipts: HashMap<TxHash, TransactionReceipt>,
    contracts: HashMap<Address, String>,
    deployments: Vec<DeployRequest>,
    calls: Vec<CallRequest>,
    events: Vec<ChainEvent>,
    failing_contracts: HashSet<String>,
    failing_methods: HashSet<String>,
    funds_exhausted: bool,
}

/// In-memory chain bound to one network.
pub struct SimulatedChain {
    network: NetworkId,
    poll_interval: Duration,
    state: RwLock<ChainState>,
}

impl SimulatedChain {
    /// Create a chain that mines a block whenever a receipt is awaited.
    pub fn new(network: impl Into<NetworkId>) -> Self {
        Self {
            network: network.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: RwLock::new(ChainState {
                auto_mine: true,
                ..Default::default()
            }),
        }
    }

    /// Disable or enable auto-mining. With auto-mining off, receipts only gain
    /// confirmations through [`mine`](Self::mine).
    pub fn with_auto_mine(self, auto_mine: bool) -> Self {
        self.state.write().auto_mine = auto_mine;
        self
    }

    /// Override the interval between receipt polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Mine `blocks` empty blocks.
    pub fn mine(&self, blocks: u64) {
        self.state.write().head += blocks;
    }

    /// Make every deployment of `contract` revert.
    pub fn fail_deployments_of(&self, contract: impl Into<String>) {
        self.state.write().failing_contracts.insert(contract.into());
    }

    /// Make every call to `method` revert.
    pub fn revert_calls_to(&self, method: impl Into<String>) {
        self.state.write().failing_methods.insert(method.into());
    }

    /// Clear all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.state.write();
        state.failing_contracts.clear();
        state.failing_methods.clear();
        state.funds_exhausted = false;
    }

    /// Make every subsequent submission fail with `InsufficientFunds`.
    pub fn exhaust_funds(&self) {
        self.state.write().funds_exhausted = true;
    }

    /// Emit an event in a new block, as if a transaction on this chain had
    /// produced it.
    pub fn emit_event(
        &self,
        emitter: Address,
        name: impl Into<String>,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> ChainEvent {
        let mut state = self.state.write();
        state.nonce += 1;
        state.head += 1;
        let event = ChainEvent {
            emitter,
            name: name.into(),
            block_number: state.head,
            tx_hash: TxHash::new(self.digest(b"event", state.nonce)),
            fields,
        };
        state.events.push(event.clone());
        event
    }

    /// Number of contract creations submitted so far.
    pub fn deployment_count(&self) -> usize {
        self.state.read().deployments.len()
    }

    /// Contract creations submitted so far, in order.
    pub fn deployments(&self) -> Vec<DeployRequest> {
        self.state.read().deployments.clone()
    }

    /// Number of calls submitted so far.
    pub fn call_count(&self) -> usize {
        self.state.read().calls.len()
    }

    /// Calls submitted so far, in order.
    pub fn calls(&self) -> Vec<CallRequest> {
        self.state.read().calls.clone()
    }

    /// Contract type deployed at `address`, if any.
    pub fn contract_at(&self, address: &Address) -> Option<String> {
        self.state.read().contracts.get(address).cloned()
    }

    /// Current head without going through the async port.
    pub fn head(&self) -> u64 {
        self.state.read().head
    }

    fn digest(&self, domain: &[u8], nonce: u64) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(self.network.as_str().as_bytes());
        hasher.update(domain);
        hasher.update(nonce.to_be_bytes());
        hasher.finalize().into()
    }

    fn include(
        &self,
        state: &mut ChainState,
        status: TxStatus,
        contract_address: Option<Address>,
    ) -> TxHash {
        state.head += 1;
        let tx_hash = TxHash::new(self.digest(b"tx", state.nonce));
        state.receipts.insert(
            tx_hash,
            TransactionReceipt {
                tx_hash,
                block_number: state.head,
                status,
                contract_address,
                confirmations: 1,
            },
        );
        tx_hash
    }
}

#[async_trait]
impl ChainClient for SimulatedChain {
    fn network(&self) -> &NetworkId {
        &self.network
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.state.read().head)
    }

    async fn deploy_contract(&self, request: &DeployRequest) -> Result<TxHash, ChainError> {
        let mut state = self.state.write();
        if state.funds_exhausted {
            return Err(ChainError::InsufficientFunds {
                network: self.network.clone(),
                operation: format!("deploy {}", request.contract),
            });
        }

        state.nonce += 1;
        state.deployments.push(request.clone());

        if state.failing_contracts.contains(&request.contract) {
            let reason = format!("{} constructor reverted", request.contract);
            return Ok(self.include(&mut state, TxStatus::Reverted { reason }, None));
        }

        let mut address = [0u8; 20];
        address.copy_from_slice(&self.digest(b"create", state.nonce)[12..]);
        let address = Address::new(address);
        state.contracts.insert(address, request.contract.clone());

        debug!(
            "[sim:{}] deployed {} at {}",
            self.network, request.contract, address
        );
        Ok(self.include(&mut state, TxStatus::Success, Some(address)))
    }

    async fn send_transaction(&self, request: &CallRequest) -> Result<TxHash, ChainError> {
        let mut state = self.state.write();
        if state.funds_exhausted {
            return Err(ChainError::InsufficientFunds {
                network: self.network.clone(),
                operation: request.method.clone(),
            });
        }

        state.nonce += 1;
        state.calls.push(request.clone());

        let status = if state.failing_methods.contains(&request.method) {
            TxStatus::Reverted {
                reason: format!("{} reverted", request.method),
            }
        } else {
            TxStatus::Success
        };

        debug!(
            "[sim:{}] call {}.{} -> {:?}",
            self.network, request.to, request.method, status
        );
        Ok(self.include(&mut state, status, None))
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: &TxHash,
        confirmations: u64,
    ) -> Result<TransactionReceipt, ChainError> {
        loop {
            let auto_mine = {
                let mut state = self.state.write();
                let receipt = state
                    .receipts
                    .get(tx_hash)
                    .cloned()
                    .ok_or(ChainError::UnknownTransaction(*tx_hash))?;

                let observed = state.head.saturating_sub(receipt.block_number) + 1;
                if observed >= confirmations {
                    return Ok(TransactionReceipt {
                        confirmations: observed,
                        ..receipt
                    });
                }

                if state.auto_mine {
                    state.head += 1;
                }
                state.auto_mine
            };

            if auto_mine {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }

    async fn get_events(&self, filter: &EventFilter) -> Result<Vec<ChainEvent>, ChainError> {
        Ok(self
            .state
            .read()
            .events
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect())
    }
}
