//! # Domain Errors

use cs_03_deployment_orchestrator::DeployError;
use shared_types::NetworkId;
use thiserror::Error;

use super::message::FailureReason;
use super::state::RelayState;

/// Relay Dispatcher errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// No strategy is registered for the satellite network.
    #[error("No message relay implementation from {satellite} -> {primary}")]
    UnsupportedRelayTarget {
        /// Satellite network asked for.
        satellite: NetworkId,
        /// Primary network.
        primary: NetworkId,
    },

    /// A relay attempt was driven through an illegal state change.
    #[error("Invalid relay transition for nonce {nonce}: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Message nonce.
        nonce: u64,
        /// Current state.
        from: RelayState,
        /// Requested state.
        to: RelayState,
    },

    /// A message was not delivered.
    #[error("Relay of message {nonce} failed: {reason}")]
    RelayFailed {
        /// Message nonce.
        nonce: u64,
        /// Why.
        reason: FailureReason,
    },

    /// A message was handed to a satellite it is not addressed to.
    #[error("Message {nonce} is destined for {destination}, not {satellite}")]
    DestinationMismatch {
        /// Message nonce.
        nonce: u64,
        /// Message destination.
        destination: NetworkId,
        /// Satellite context given.
        satellite: NetworkId,
    },

    /// A bridge endpoint is not known on a network.
    #[error("Contract {name} is not known on {network}")]
    MissingContract {
        /// Network searched.
        network: NetworkId,
        /// Contract name.
        name: String,
    },

    /// Pending messages could not be read from the primary network.
    #[error("Failed to discover messages on {network}: {reason}")]
    Discovery {
        /// Primary network.
        network: NetworkId,
        /// Underlying error.
        reason: String,
    },

    /// Context lookup failed.
    #[error("Context error: {0}")]
    Context(#[from] DeployError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_target_message() {
        let err = RelayError::UnsupportedRelayTarget {
            satellite: NetworkId::from("arbitrum"),
            primary: NetworkId::from("mainnet"),
        };
        assert_eq!(
            err.to_string(),
            "No message relay implementation from arbitrum -> mainnet"
        );
    }
}
