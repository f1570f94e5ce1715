//! # Domain Errors

use std::time::Duration;

use cs_01_asset_registry::RegistryError;
use cs_02_artifact_store::StoreError;
use shared_types::{ChainError, NetworkId, TxHash};
use thiserror::Error;

/// Why an on-chain step failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// The transaction was included but reverted.
    #[error("transaction {tx_hash} reverted: {reason}")]
    Reverted {
        /// Reverted transaction.
        tx_hash: TxHash,
        /// Revert reason.
        reason: String,
    },

    /// Confirmation did not arrive in time.
    #[error("transaction {tx_hash} not confirmed after {after:?}")]
    Timeout {
        /// Pending transaction.
        tx_hash: TxHash,
        /// Configured wait.
        after: Duration,
    },

    /// A creation receipt carried no contract address.
    #[error("creation transaction {tx_hash} produced no contract address")]
    MissingContractAddress {
        /// Creation transaction.
        tx_hash: TxHash,
    },

    /// The node refused the transaction.
    #[error("submission failed: {0}")]
    Submission(ChainError),

    /// Waiting for the receipt failed.
    #[error("confirmation failed: {0}")]
    Confirmation(ChainError),
}

impl FailureCause {
    /// Whether re-running the plan may succeed without changing the spec.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FailureCause::Timeout { .. }
                | FailureCause::Submission(ChainError::Rpc { .. })
                | FailureCause::Submission(ChainError::InsufficientFunds { .. })
                | FailureCause::Confirmation(_)
        )
    }
}

/// Deployment Orchestrator errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// A required asset has no known contract on the network.
    #[error("Unknown asset {symbol} on {network}")]
    UnknownAsset {
        /// Requested symbol.
        symbol: String,
        /// Target network.
        network: NetworkId,
    },

    /// The dependency graph has a cycle.
    #[error("Cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency {
        /// Cycle path, first element repeated at the end.
        cycle: Vec<String>,
    },

    /// An on-chain step failed; the rest of the plan was not attempted.
    #[error("Deployment of {artifact_name} failed: {cause}")]
    DeploymentFailed {
        /// Step that failed.
        artifact_name: String,
        /// What went wrong.
        cause: FailureCause,
    },

    /// Two steps or assets share a name.
    #[error("Duplicate name {name} in deployment spec")]
    DuplicateName {
        /// Repeated name.
        name: String,
    },

    /// A step references a name that is not declared.
    #[error("Step {step} references undeclared {reference}")]
    UnresolvedReference {
        /// Referencing step.
        step: String,
        /// Missing name.
        reference: String,
    },

    /// A `$ref` or call target names a call instead of a contract.
    #[error("Step {step} references {reference}, which is not a contract")]
    InvalidReference {
        /// Referencing step.
        step: String,
        /// Offending name.
        reference: String,
    },

    /// A `$config` key is absent from the spec's config.
    #[error("Step {step} needs missing config key {key}")]
    MissingConfig {
        /// Referencing step.
        step: String,
        /// Missing key.
        key: String,
    },

    /// The chain client is bound to a different network than the context.
    #[error("Network mismatch: client is on {actual}, expected {expected}")]
    NetworkMismatch {
        /// Context network.
        expected: NetworkId,
        /// Client network.
        actual: NetworkId,
    },

    /// The stored record under a step's name came from a different step.
    /// Forcing the step replaces it.
    #[error("Stored {artifact_name} is {stored}, but the plan expects {expected}")]
    StoreMismatch {
        /// Step name.
        artifact_name: String,
        /// What the store holds.
        stored: String,
        /// What the step produces.
        expected: String,
    },

    /// Artifact Store failure, including `ArtifactAlreadyExists`.
    #[error("Artifact store error: {0}")]
    Store(#[from] StoreError),

    /// Spider configuration could not be loaded.
    #[error("Invalid deployment config {path}: {message}")]
    Config {
        /// File or source.
        path: String,
        /// What is wrong.
        message: String,
    },
}

impl DeployError {
    /// Whether a re-run of the same spec may succeed (resume).
    pub fn is_retryable(&self) -> bool {
        match self {
            DeployError::DeploymentFailed { cause, .. } => cause.is_transient(),
            DeployError::Store(StoreError::Io { .. } | StoreError::Locked { .. }) => true,
            _ => false,
        }
    }

    pub(crate) fn failed(artifact_name: &str, cause: FailureCause) -> Self {
        DeployError::DeploymentFailed {
            artifact_name: artifact_name.to_string(),
            cause,
        }
    }
}

impl From<RegistryError> for DeployError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownAsset { symbol, network } => {
                DeployError::UnknownAsset { symbol, network }
            }
            RegistryError::Parse {
                source_name,
                message,
            } => DeployError::Config {
                path: source_name,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = DeployError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Cyclic dependency: a -> b -> a");
    }

    #[test]
    fn test_registry_error_conversion() {
        let err: DeployError = RegistryError::UnknownAsset {
            symbol: "USDC".to_string(),
            network: NetworkId::from("polygon"),
        }
        .into();
        assert_eq!(
            err,
            DeployError::UnknownAsset {
                symbol: "USDC".to_string(),
                network: NetworkId::from("polygon"),
            }
        );
    }

    #[test]
    fn test_retryability() {
        let timeout = DeployError::failed(
            "comet",
            FailureCause::Timeout {
                tx_hash: TxHash::ZERO,
                after: Duration::from_secs(1),
            },
        );
        assert!(timeout.is_retryable());

        let reverted = DeployError::failed(
            "comet",
            FailureCause::Reverted {
                tx_hash: TxHash::ZERO,
                reason: "bad config".to_string(),
            },
        );
        assert!(!reverted.is_retryable());
        assert!(!DeployError::CyclicDependency { cycle: vec![] }.is_retryable());
    }
}
