//! # Relay Configuration

use std::collections::BTreeMap;
use std::time::Duration;

use shared_types::NetworkId;

/// Tuning shared by the built-in strategies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    /// Upper bound on each confirmation wait, predecessors included.
    pub confirmation_timeout: Duration,
    /// Interval between ordering re-checks while waiting on predecessors.
    pub poll_interval: Duration,
    /// Per-network confirmation overrides.
    pub confirmations: BTreeMap<NetworkId, u64>,
}

impl RelayConfig {
    /// Default confirmation bound (Polygon checkpoints take tens of minutes).
    pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(1800);
    /// Default ordering re-check interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

    /// Override confirmations for `network`.
    pub fn with_confirmations(mut self, network: impl Into<NetworkId>, confirmations: u64) -> Self {
        self.confirmations.insert(network.into(), confirmations);
        self
    }

    /// Override the confirmation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Override the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Self::DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            confirmations: BTreeMap::new(),
        }
    }
}
