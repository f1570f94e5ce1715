//! # Deployment Orchestrator Service
//!
//! Executes a [`DeploymentPlan`] against one network.
//!
//! ## Run Sequence
//!
//! ```text
//! 1. Build plan        names, references, config keys, cycles
//! 2. Bind assets       every required symbol resolved via the registry
//! 3. For each step in order:
//!      store.get(network, name)
//!        present, not forced -> reuse
//!        otherwise           -> submit, wait (bounded), persist
//! ```
//!
//! Steps 1 and 2 submit nothing, so spec errors and unknown assets never
//! leave a half-applied plan behind. A failure in step 3 aborts the run;
//! everything persisted before it is reused on the next run.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use cs_02_artifact_store::{Artifact, ArtifactKind, CreationRecord, DeployedSet};
use shared_types::{CallRequest, DeployRequest, TransactionReceipt, TxHash, TxStatus};
use tracing::{debug, error, info, warn};

use crate::algorithms::Bindings;
use crate::context::DeploymentManagerContext;
use crate::domain::{
    DeployError, DeploySpec, Deployed, DeploymentPlan, FailureCause, PlanStep, StepAction,
    StepKind,
};
use crate::ports::DeploymentApi;

/// Which steps to recreate even though the store has them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ForceRedeploy {
    /// Reuse everything that exists.
    #[default]
    None,
    /// Recreate every step.
    All,
    /// Recreate only the named steps.
    Only(BTreeSet<String>),
}

/// Options for [`DeploymentApi::deploy_with`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Forced redeploys.
    pub force: ForceRedeploy,
}

impl DeployOptions {
    /// Recreate every step.
    pub fn force_all() -> Self {
        Self {
            force: ForceRedeploy::All,
        }
    }

    /// Recreate the named steps.
    pub fn force<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            force: ForceRedeploy::Only(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether step `name` must be recreated.
    pub fn is_forced(&self, name: &str) -> bool {
        match &self.force {
            ForceRedeploy::None => false,
            ForceRedeploy::All => true,
            ForceRedeploy::Only(names) => names.contains(name),
        }
    }
}

/// Stateless orchestrator. All run state lives in the context and the store.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeploymentOrchestrator;

impl DeploymentOrchestrator {
    /// Create an orchestrator.
    pub fn new() -> Self {
        Self
    }

    /// Submit one step and wait for it. Nothing is persisted here.
    async fn execute(
        &self,
        ctx: &DeploymentManagerContext,
        step: &PlanStep,
        bindings: &Bindings<'_>,
    ) -> Result<Artifact, DeployError> {
        let network = ctx.network();
        let args = bindings.resolve_all(&step.name, step.args())?;

        match &step.kind {
            StepKind::Deploy { contract, .. } => {
                let request = DeployRequest {
                    contract: contract.clone(),
                    args: args.clone(),
                };
                let tx_hash = ctx
                    .client()
                    .deploy_contract(&request)
                    .await
                    .map_err(|e| DeployError::failed(&step.name, FailureCause::Submission(e)))?;
                info!(
                    network = %network,
                    artifact = %step.name,
                    "[cs-03] Deploying {} ({})",
                    contract,
                    tx_hash
                );

                let receipt = self.confirm(ctx, &step.name, tx_hash).await?;
                let address = receipt.contract_address.ok_or_else(|| {
                    DeployError::failed(&step.name, FailureCause::MissingContractAddress { tx_hash })
                })?;

                Ok(
                    Artifact::contract(network.clone(), &step.name, contract, address)
                        .with_creation(CreationRecord::now(tx_hash, receipt.block_number))
                        .with_args(args),
                )
            }
            StepKind::Call { target, method, .. } => {
                let to = bindings.artifact(&step.name, target)?;
                let request = CallRequest {
                    from: None,
                    to,
                    method: method.clone(),
                    args: args.clone(),
                };
                let tx_hash = ctx
                    .client()
                    .send_transaction(&request)
                    .await
                    .map_err(|e| DeployError::failed(&step.name, FailureCause::Submission(e)))?;
                info!(
                    network = %network,
                    artifact = %step.name,
                    "[cs-03] Calling {}.{} ({})",
                    target,
                    method,
                    tx_hash
                );

                let receipt = self.confirm(ctx, &step.name, tx_hash).await?;
                Ok(Artifact::invocation(network.clone(), &step.name, method, to)
                    .with_creation(CreationRecord::now(tx_hash, receipt.block_number))
                    .with_args(args))
            }
        }
    }

    /// Wait for `tx_hash` with the network's confirmation count, bounded by
    /// its confirmation timeout.
    async fn confirm(
        &self,
        ctx: &DeploymentManagerContext,
        step_name: &str,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt, DeployError> {
        let settings = ctx.settings();
        let wait = ctx
            .client()
            .wait_for_receipt(&tx_hash, settings.confirmations);

        let receipt = match tokio::time::timeout(settings.confirmation_timeout, wait).await {
            Err(_) => {
                return Err(DeployError::failed(
                    step_name,
                    FailureCause::Timeout {
                        tx_hash,
                        after: settings.confirmation_timeout,
                    },
                ))
            }
            Ok(Err(e)) => {
                return Err(DeployError::failed(step_name, FailureCause::Confirmation(e)))
            }
            Ok(Ok(receipt)) => receipt,
        };

        if let TxStatus::Reverted { reason } = &receipt.status {
            return Err(DeployError::failed(
                step_name,
                FailureCause::Reverted {
                    tx_hash,
                    reason: reason.clone(),
                },
            ));
        }

        debug!(
            "[cs-03] {} confirmed in block {} ({} confirmations)",
            tx_hash, receipt.block_number, receipt.confirmations
        );
        Ok(receipt)
    }
}

/// Whether a stored record was produced by this step.
fn matches_step(existing: &Artifact, step: &PlanStep) -> bool {
    match (&existing.kind, &step.kind) {
        (ArtifactKind::Contract { contract: stored }, StepKind::Deploy { contract, .. }) => {
            stored == contract
        }
        (ArtifactKind::Invocation { method: stored }, StepKind::Call { method, .. }) => {
            stored == method
        }
        _ => false,
    }
}

fn store_mismatch(existing: &Artifact, step: &PlanStep) -> DeployError {
    let stored = match &existing.kind {
        ArtifactKind::Contract { contract } => format!("contract {}", contract),
        ArtifactKind::Invocation { method } => format!("call {}", method),
        ArtifactKind::Asset { symbol } => format!("asset {}", symbol),
    };
    let expected = match &step.kind {
        StepKind::Deploy { contract, .. } => format!("contract {}", contract),
        StepKind::Call { method, .. } => format!("call {}", method),
    };
    DeployError::StoreMismatch {
        artifact_name: step.name.clone(),
        stored,
        expected,
    }
}

#[async_trait]
impl DeploymentApi for DeploymentOrchestrator {
    fn plan(&self, spec: &DeploySpec) -> Result<DeploymentPlan, DeployError> {
        DeploymentPlan::build(spec)
    }

    async fn deploy_with(
        &self,
        ctx: &mut DeploymentManagerContext,
        spec: &DeploySpec,
        options: &DeployOptions,
    ) -> Result<Deployed, DeployError> {
        let plan = self.plan(spec)?;
        if let ForceRedeploy::Only(names) = &options.force {
            if let Some(unknown) = names.iter().find(|name| plan.step(name).is_none()) {
                return Err(DeployError::UnresolvedReference {
                    step: "force".to_string(),
                    reference: unknown.clone(),
                });
            }
        }

        let network = ctx.network().clone();
        if !spec.deployment.is_empty() && spec.deployment != ctx.deployment() {
            warn!(
                "[cs-03] Spec {} deployed through context for {}",
                spec.deployment,
                ctx.deployment()
            );
        }
        info!(
            "[cs-03] Deploying {} on {}: {} steps, {} assets",
            plan.deployment(),
            network,
            plan.len(),
            plan.required_assets().len()
        );

        // Assets first: an unknown symbol must fail before any transaction.
        let mut assets = BTreeMap::new();
        let mut artifacts = DeployedSet::new();
        for symbol in plan.required_assets() {
            let address = ctx.registry().resolve(&network, symbol)?;
            assets.insert(symbol.clone(), address);
            artifacts.insert(Artifact::asset(network.clone(), symbol.clone(), address));
        }

        let mut produced = BTreeMap::new();
        let mut actions = Vec::with_capacity(plan.len());
        for step in plan.steps() {
            let forced = options.is_forced(&step.name);
            let existing = ctx.store().get(&network, &step.name)?;

            let artifact = match existing {
                Some(existing) if !forced => {
                    if !matches_step(&existing, step) {
                        let err = store_mismatch(&existing, step);
                        error!(network = %network, artifact = %step.name, "[cs-03] {}", err);
                        return Err(err);
                    }
                    debug!(
                        network = %network,
                        artifact = %step.name,
                        "[cs-03] Reusing {}",
                        existing.address
                    );
                    actions.push((step.name.clone(), StepAction::Reused));
                    existing
                }
                existing => {
                    let bindings = Bindings::new(&network, &produced, &assets, &spec.config);
                    let artifact = self
                        .execute(ctx, step, &bindings)
                        .await
                        .inspect_err(|e| {
                            error!(
                                network = %network,
                                artifact = %step.name,
                                "[cs-03] Step failed: {}",
                                e
                            )
                        })?;

                    ctx.store()
                        .put(&network, &step.name, artifact.clone(), existing.is_some())?;
                    actions.push((step.name.clone(), StepAction::Created));
                    artifact
                }
            };

            produced.insert(step.name.clone(), artifact.address);
            artifacts.insert(artifact);
        }

        let created = actions
            .iter()
            .filter(|(_, a)| *a == StepAction::Created)
            .count();
        info!(
            "[cs-03] Deployed {} on {}: {} created, {} reused",
            plan.deployment(),
            network,
            created,
            actions.len() - created
        );

        Ok(Deployed {
            network,
            deployment: plan.deployment().to_string(),
            artifacts,
            actions,
        })
    }
}
