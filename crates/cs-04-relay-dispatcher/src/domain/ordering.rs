//! # Delivery Ordering
//!
//! Per-destination ledger for bridges that must deliver in nonce order.
//! A nonce is confirmed only once every lower known nonce for the same
//! destination is confirmed. Known nonces are those discovered on the origin
//! chain plus those submitted. A failed lower nonce blocks everything above it
//! until it is submitted again.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use parking_lot::Mutex;
use shared_types::NetworkId;
use thiserror::Error;
use tokio::sync::Notify;

/// Ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A lower nonce failed and has not been resubmitted.
    #[error("Message {nonce} is blocked by failed predecessor {by}")]
    Blocked {
        /// Waiting nonce.
        nonce: u64,
        /// Failed predecessor.
        by: u64,
    },

    /// The nonce was never recorded as submitted.
    #[error("Message {nonce} was never submitted")]
    NotSubmitted {
        /// Unknown nonce.
        nonce: u64,
    },
}

#[derive(Debug, Default)]
struct Destination {
    discovered: BTreeSet<u64>,
    submitted: BTreeSet<u64>,
    confirmed: BTreeSet<u64>,
    failed: BTreeSet<u64>,
}

/// Tracks submissions and confirmations per destination network.
#[derive(Debug, Default)]
pub struct DeliveryLedger {
    destinations: Mutex<HashMap<NetworkId, Destination>>,
    changed: Notify,
}

impl DeliveryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record nonces found on the origin chain for `destination`.
    ///
    /// Higher nonces wait on these even if they are never submitted.
    pub fn record_discovered(
        &self,
        destination: &NetworkId,
        nonces: impl IntoIterator<Item = u64>,
    ) {
        let mut guard = self.destinations.lock();
        let entry = guard.entry(destination.clone()).or_default();
        entry.discovered.extend(nonces);
    }

    /// Record that `nonce` was sent. Clears an earlier failure.
    pub fn record_submitted(&self, destination: &NetworkId, nonce: u64) {
        let mut guard = self.destinations.lock();
        let entry = guard.entry(destination.clone()).or_default();
        entry.submitted.insert(nonce);
        entry.failed.remove(&nonce);
    }

    /// Record that `nonce` will not be delivered.
    pub fn record_failed(&self, destination: &NetworkId, nonce: u64) {
        {
            let mut guard = self.destinations.lock();
            let entry = guard.entry(destination.clone()).or_default();
            if !entry.confirmed.contains(&nonce) {
                entry.failed.insert(nonce);
            }
        }
        self.changed.notify_waiters();
    }

    /// Confirm `nonce` if every lower known nonce is confirmed.
    ///
    /// Returns `Ok(false)` while a predecessor is still in flight.
    pub fn try_confirm(&self, destination: &NetworkId, nonce: u64) -> Result<bool, LedgerError> {
        let confirmed = {
            let mut guard = self.destinations.lock();
            let entry = guard.entry(destination.clone()).or_default();

            if entry.confirmed.contains(&nonce) {
                return Ok(true);
            }
            if !entry.submitted.contains(&nonce) {
                return Err(LedgerError::NotSubmitted { nonce });
            }
            if let Some(&by) = entry.failed.range(..nonce).next() {
                return Err(LedgerError::Blocked { nonce, by });
            }

            let waiting = entry
                .submitted
                .range(..nonce)
                .chain(entry.discovered.range(..nonce))
                .any(|lower| !entry.confirmed.contains(lower));
            if waiting {
                false
            } else {
                entry.confirmed.insert(nonce);
                true
            }
        };

        if confirmed {
            self.changed.notify_waiters();
        }
        Ok(confirmed)
    }

    /// Wait until `nonce` can be confirmed.
    ///
    /// `poll` bounds each sleep between re-checks; callers bound the total
    /// wait with their own timeout.
    pub async fn confirm_in_order(
        &self,
        destination: &NetworkId,
        nonce: u64,
        poll: Duration,
    ) -> Result<(), LedgerError> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.try_confirm(destination, nonce)? {
                return Ok(());
            }
            let _ = tokio::time::timeout(poll, notified).await;
        }
    }

    /// Whether `nonce` is confirmed.
    pub fn is_confirmed(&self, destination: &NetworkId, nonce: u64) -> bool {
        self.destinations
            .lock()
            .get(destination)
            .map(|d| d.confirmed.contains(&nonce))
            .unwrap_or(false)
    }

    /// Confirmed nonces, ascending.
    pub fn confirmed(&self, destination: &NetworkId) -> Vec<u64> {
        self.destinations
            .lock()
            .get(destination)
            .map(|d| d.confirmed.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Submitted nonces neither confirmed nor failed, ascending.
    pub fn in_flight(&self, destination: &NetworkId) -> Vec<u64> {
        self.destinations
            .lock()
            .get(destination)
            .map(|d| {
                d.submitted
                    .iter()
                    .filter(|n| !d.confirmed.contains(n) && !d.failed.contains(n))
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn polygon() -> NetworkId {
        NetworkId::from("polygon")
    }

    #[test]
    fn test_confirm_in_order() {
        let ledger = DeliveryLedger::new();
        ledger.record_submitted(&polygon(), 1);
        ledger.record_submitted(&polygon(), 2);

        assert_eq!(ledger.try_confirm(&polygon(), 2), Ok(false));
        assert_eq!(ledger.try_confirm(&polygon(), 1), Ok(true));
        assert_eq!(ledger.try_confirm(&polygon(), 2), Ok(true));
        assert_eq!(ledger.confirmed(&polygon()), vec![1, 2]);
    }

    #[test]
    fn test_unsubmitted_nonce() {
        let ledger = DeliveryLedger::new();
        assert_eq!(
            ledger.try_confirm(&polygon(), 4),
            Err(LedgerError::NotSubmitted { nonce: 4 })
        );
    }

    #[test]
    fn test_failed_predecessor_blocks() {
        let ledger = DeliveryLedger::new();
        ledger.record_submitted(&polygon(), 1);
        ledger.record_submitted(&polygon(), 2);
        ledger.record_failed(&polygon(), 1);

        assert_eq!(
            ledger.try_confirm(&polygon(), 2),
            Err(LedgerError::Blocked { nonce: 2, by: 1 })
        );

        // Resubmission clears the block.
        ledger.record_submitted(&polygon(), 1);
        assert_eq!(ledger.try_confirm(&polygon(), 2), Ok(false));
        assert_eq!(ledger.in_flight(&polygon()), vec![1, 2]);
    }

    #[test]
    fn test_discovered_predecessor_holds_back_later_nonce() {
        let ledger = DeliveryLedger::new();
        ledger.record_discovered(&polygon(), [1, 2]);
        ledger.record_submitted(&polygon(), 2);

        // 1 was never submitted, but it still goes first.
        assert_eq!(ledger.try_confirm(&polygon(), 2), Ok(false));
        assert!(ledger.confirmed(&polygon()).is_empty());

        ledger.record_submitted(&polygon(), 1);
        assert_eq!(ledger.try_confirm(&polygon(), 1), Ok(true));
        assert_eq!(ledger.try_confirm(&polygon(), 2), Ok(true));
        assert_eq!(ledger.confirmed(&polygon()), vec![1, 2]);
    }

    #[test]
    fn test_destinations_are_independent() {
        let ledger = DeliveryLedger::new();
        let mumbai = NetworkId::from("mumbai");
        ledger.record_submitted(&polygon(), 1);
        ledger.record_submitted(&mumbai, 2);

        assert_eq!(ledger.try_confirm(&mumbai, 2), Ok(true));
        assert!(!ledger.is_confirmed(&polygon(), 1));
    }

    #[tokio::test]
    async fn test_waiter_released_by_predecessor() {
        let ledger = Arc::new(DeliveryLedger::new());
        ledger.record_submitted(&polygon(), 1);
        ledger.record_submitted(&polygon(), 2);

        let waiter = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger
                    .confirm_in_order(&polygon(), 2, Duration::from_secs(60))
                    .await
            })
        };

        tokio::task::yield_now().await;
        assert!(!ledger.is_confirmed(&polygon(), 2));
        assert_eq!(ledger.try_confirm(&polygon(), 1), Ok(true));

        let result = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Ok(()));
        assert_eq!(ledger.confirmed(&polygon()), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_waiter_fails_when_predecessor_fails() {
        let ledger = Arc::new(DeliveryLedger::new());
        ledger.record_submitted(&polygon(), 1);
        ledger.record_submitted(&polygon(), 2);

        let waiter = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger
                    .confirm_in_order(&polygon(), 2, Duration::from_secs(60))
                    .await
            })
        };

        tokio::task::yield_now().await;
        ledger.record_failed(&polygon(), 1);

        let result = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(LedgerError::Blocked { nonce: 2, by: 1 }));
    }
}
