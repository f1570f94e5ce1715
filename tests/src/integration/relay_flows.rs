//! # Relay Flows
//!
//! Governance proposals executed on mainnet reach the Polygon deployment
//! through the FxPortal state sync.

#[cfg(test)]
mod tests {
    use cs_04_relay_dispatcher::{FailureReason, RelayState};
    use serde_json::{json, Map};
    use shared_types::{Address, NetworkId};

    use crate::integration::fixtures::{harness, Harness};

    const STATE_SENDER: &str = "0x28e4F3a7f651294B9564800b2D01f35189A5bFbE";
    const FX_CHILD: &str = "0x8397259c983751DAf40400790063935a11afa28a";

    fn fast(dir: &std::path::Path) -> Harness {
        harness(dir, &["mainnet", "polygon"], |config| {
            config.relay.poll_interval_ms = 10;
            config.relay.confirmation_timeout_secs = 5;
            config.relay.confirmations.insert(NetworkId::from("mainnet"), 1);
            config.relay.confirmations.insert(NetworkId::from("polygon"), 1);
        })
    }

    fn state_synced(h: &Harness, id: u64, receiver: &str) {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(id));
        fields.insert("contractAddress".to_string(), json!(receiver));
        fields.insert("data".to_string(), json!("0xc0ffee"));
        let sender: Address = STATE_SENDER.parse().unwrap();
        h.chain("mainnet").emit_event(sender, "StateSynced", fields);
    }

    #[tokio::test]
    async fn test_deploy_then_relay_to_polygon() {
        let dir = tempfile::tempdir().unwrap();
        let h = fast(dir.path());
        let polygon = NetworkId::from("polygon");

        h.runtime.deploy(&polygon, "usdc").await.unwrap();
        let calls_after_deploy = h.chain("polygon").call_count();

        state_synced(&h, 7, FX_CHILD);
        state_synced(&h, 8, FX_CHILD);
        state_synced(&h, 9, "0x000000000000000000000000000000000000dead");

        let receipt = h.runtime.relay(&polygon).await.unwrap();
        assert!(receipt.is_success());
        let nonces: Vec<u64> = receipt.attempts.iter().map(|a| a.nonce()).collect();
        assert_eq!(nonces, vec![7, 8]);
        assert!(receipt
            .attempts
            .iter()
            .all(|a| a.state == RelayState::Confirmed));

        let relayed = &h.chain("polygon").calls()[calls_after_deploy..];
        assert_eq!(relayed.len(), 2);
        assert_eq!(relayed[0].method, "onStateReceive");
        assert_eq!(relayed[0].to, FX_CHILD.parse::<Address>().unwrap());

        // Confirmed messages are not relayed twice.
        let again = h.runtime.relay(&polygon).await.unwrap();
        assert!(again.attempts.is_empty());
        assert_eq!(h.chain("polygon").call_count(), calls_after_deploy + 2);
    }

    #[tokio::test]
    async fn test_relay_without_funds_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let h = fast(dir.path());
        h.chain("polygon").exhaust_funds();
        state_synced(&h, 1, FX_CHILD);

        let receipt = h.runtime.relay(&NetworkId::from("polygon")).await.unwrap();
        assert!(!receipt.is_success());
        let (nonce, reason) = receipt.first_failure().unwrap();
        assert_eq!(nonce, 1);
        assert_eq!(reason, &FailureReason::InsufficientFunds);
    }

    #[tokio::test]
    async fn test_relay_to_unsupported_network() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path(), &["mainnet", "arbitrum"], |_| {});

        let err = h
            .runtime
            .relay(&NetworkId::from("arbitrum"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No message relay implementation from arbitrum -> mainnet"
        );
        assert_eq!(h.chain("arbitrum").call_count(), 0);
    }
}
