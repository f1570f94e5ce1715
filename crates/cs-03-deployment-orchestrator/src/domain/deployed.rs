//! # Deployment Result

use cs_02_artifact_store::{Artifact, DeployedSet};
use serde::{Deserialize, Serialize};
use shared_types::{Address, NetworkId};

/// What a run did with one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    /// A transaction was submitted and confirmed.
    Created,
    /// The Artifact Store already had it.
    Reused,
}

/// Output of one orchestrator run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deployed {
    /// Target network.
    pub network: NetworkId,
    /// Deployment name.
    pub deployment: String,
    /// Declared artifacts plus the asset bindings consumed.
    pub artifacts: DeployedSet,
    /// Per-step action in execution order.
    pub actions: Vec<(String, StepAction)>,
}

impl Deployed {
    /// Artifact named `name` (contract, invocation or asset symbol).
    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.get(name)
    }

    /// Address of `name`.
    pub fn address(&self, name: &str) -> Option<Address> {
        self.artifacts.address(name)
    }

    /// Steps that submitted a transaction.
    pub fn created(&self) -> Vec<&str> {
        self.with_action(StepAction::Created)
    }

    /// Steps satisfied from the store.
    pub fn reused(&self) -> Vec<&str> {
        self.with_action(StepAction::Reused)
    }

    /// Whether the run submitted nothing.
    pub fn is_noop(&self) -> bool {
        self.created().is_empty()
    }

    fn with_action(&self, action: StepAction) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
