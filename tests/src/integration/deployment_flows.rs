//! # Deployment Flows
//!
//! The shipped Polygon USDC configuration deployed end to end through the
//! runtime: ordering, asset binding, resume after a failed step, forced
//! redeploys.

#[cfg(test)]
mod tests {
    use cs_02_artifact_store::{ArtifactKind, ArtifactStore};
    use cs_03_deployment_orchestrator::{DeployError, DeployOptions};
    use serde_json::json;
    use shared_types::{Address, NetworkId};

    use crate::integration::fixtures::harness;

    const EXPECTED_ORDER: [&str; 5] = [
        "bridgeReceiver",
        "localTimelock",
        "initializeBridgeReceiver",
        "comet",
        "bulker",
    ];

    fn polygon() -> NetworkId {
        NetworkId::from("polygon")
    }

    #[test]
    fn test_shipped_config_plans_in_dependency_order() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path(), &["polygon"], |_| {});

        let plan = h.runtime.plan(&polygon(), "usdc").unwrap();
        assert_eq!(plan.order(), EXPECTED_ORDER.to_vec());
        assert_eq!(
            plan.required_assets(),
            ["WETH", "WBTC", "WMATIC", "USDC", "DAI", "USDT"]
        );
    }

    #[tokio::test]
    async fn test_polygon_usdc_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path(), &["polygon"], |_| {});
        let chain = h.chain("polygon");

        let deployed = h.runtime.deploy(&polygon(), "usdc").await.unwrap();
        assert_eq!(deployed.created(), EXPECTED_ORDER.to_vec());
        assert_eq!(chain.deployment_count(), 4);
        assert_eq!(chain.call_count(), 1);

        // Asset bindings come back with the result but are not persisted.
        let usdc: Address = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".parse().unwrap();
        assert_eq!(deployed.address("USDC"), Some(usdc));
        assert_eq!(h.store.len(), 5);

        let bridge = deployed.address("bridgeReceiver").unwrap();
        let timelock = deployed.address("localTimelock").unwrap();
        assert_eq!(
            chain.contract_at(&bridge).as_deref(),
            Some("PolygonBridgeReceiver")
        );

        let init = &chain.calls()[0];
        assert_eq!(init.to, bridge);
        assert_eq!(init.method, "initialize");
        assert_eq!(init.args[1], json!(timelock.to_string()));

        let comet = h.store.get(&polygon(), "comet").unwrap().unwrap();
        assert_eq!(comet.args[0]["governor"], json!(timelock.to_string()));
        assert_eq!(comet.args[0]["baseToken"], json!(usdc.to_string()));

        let initialized = h
            .store
            .get(&polygon(), "initializeBridgeReceiver")
            .unwrap()
            .unwrap();
        assert!(matches!(initialized.kind, ArtifactKind::Invocation { .. }));
    }

    #[tokio::test]
    async fn test_rerun_submits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path(), &["polygon"], |_| {});
        let chain = h.chain("polygon");

        let first = h.runtime.deploy(&polygon(), "usdc").await.unwrap();
        let deployments = chain.deployment_count();
        let calls = chain.call_count();

        let second = h.runtime.deploy(&polygon(), "usdc").await.unwrap();
        assert!(second.is_noop());
        assert_eq!(second.reused(), EXPECTED_ORDER.to_vec());
        assert_eq!(chain.deployment_count(), deployments);
        assert_eq!(chain.call_count(), calls);
        assert_eq!(first.address("comet"), second.address("comet"));
    }

    #[tokio::test]
    async fn test_resume_after_failed_step() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path(), &["polygon"], |_| {});
        let chain = h.chain("polygon");
        chain.fail_deployments_of("Comet");

        let err = h.runtime.deploy(&polygon(), "usdc").await.unwrap_err();
        match err.downcast_ref::<DeployError>() {
            Some(DeployError::DeploymentFailed { artifact_name, .. }) => {
                assert_eq!(artifact_name, "comet")
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(h.store.get(&polygon(), "bulker").unwrap().is_none());
        let timelock = h
            .store
            .get(&polygon(), "localTimelock")
            .unwrap()
            .unwrap()
            .address;

        chain.clear_failures();
        let resumed = h.runtime.deploy(&polygon(), "usdc").await.unwrap();
        assert_eq!(resumed.created(), vec!["comet", "bulker"]);
        assert_eq!(
            resumed.reused(),
            vec!["bridgeReceiver", "localTimelock", "initializeBridgeReceiver"]
        );
        assert_eq!(resumed.address("localTimelock"), Some(timelock));
    }

    #[tokio::test]
    async fn test_forced_redeploy_of_one_step() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path(), &["polygon"], |_| {});

        let first = h.runtime.deploy(&polygon(), "usdc").await.unwrap();
        let forced = h
            .runtime
            .deploy_with(&polygon(), "usdc", &DeployOptions::force(["bulker"]))
            .await
            .unwrap();

        assert_eq!(forced.created(), vec!["bulker"]);
        assert_ne!(first.address("bulker"), forced.address("bulker"));
        assert_eq!(first.address("comet"), forced.address("comet"));
    }

    #[tokio::test]
    async fn test_unknown_network_config_fails_before_any_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path(), &["polygon", "fuji"], |_| {});

        assert!(h.runtime.deploy(&NetworkId::from("fuji"), "usdc").await.is_err());
        assert_eq!(h.chain("fuji").deployment_count(), 0);
        assert!(h.store.is_empty());
    }
}
