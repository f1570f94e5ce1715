//! # Outbound Ports
//!
//! Config discovery ("Spider"). The orchestrator only relies on it
//! producing well-formed specs and asset tables.

use cs_01_asset_registry::StaticAssetRegistry;
use shared_types::NetworkId;

use crate::domain::{DeployError, DeploySpec};

/// Source of deploy specs and asset tables.
pub trait ConfigSource: Send + Sync {
    /// Spec of `deployment` on `network`.
    fn load_spec(&self, network: &NetworkId, deployment: &str) -> Result<DeploySpec, DeployError>;

    /// Pre-existing assets of `network`.
    fn load_assets(&self, network: &NetworkId) -> Result<StaticAssetRegistry, DeployError>;

    /// Deployments available on `network`, sorted.
    fn deployments(&self, network: &NetworkId) -> Result<Vec<String>, DeployError>;
}
