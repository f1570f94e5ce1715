//! # Inbound Ports
//!
//! API trait defining what the Deployment Orchestrator can do.

use async_trait::async_trait;

use crate::context::DeploymentManagerContext;
use crate::domain::{DeployError, DeploySpec, Deployed, DeploymentPlan};
use crate::service::DeployOptions;

/// Deployment API - inbound port.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Validate `spec` and compute its execution order without touching any chain.
    fn plan(&self, spec: &DeploySpec) -> Result<DeploymentPlan, DeployError>;

    /// Materialize `spec` on the context's network, reusing stored artifacts.
    async fn deploy(
        &self,
        ctx: &mut DeploymentManagerContext,
        spec: &DeploySpec,
    ) -> Result<Deployed, DeployError> {
        self.deploy_with(ctx, spec, &DeployOptions::default()).await
    }

    /// As [`deploy`](Self::deploy), with explicit forced redeploys.
    async fn deploy_with(
        &self,
        ctx: &mut DeploymentManagerContext,
        spec: &DeploySpec,
        options: &DeployOptions,
    ) -> Result<Deployed, DeployError>;
}
