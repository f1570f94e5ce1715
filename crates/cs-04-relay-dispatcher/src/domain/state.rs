//! # Relay State Machine

use serde::{Deserialize, Serialize};
use shared_types::NetworkId;

use super::errors::RelayError;
use super::message::{FailureReason, GovernanceMessage, PendingReceipt, RelayOutcome};

/// State of one relay attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayState {
    /// Bridge submission built; nothing sent yet.
    Packaged,
    /// Delivery transaction sent to the satellite.
    Submitted,
    /// Delivery guaranteed by the bridge.
    Confirmed,
    /// Not delivered.
    Failed,
}

impl RelayState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: RelayState) -> bool {
        matches!(
            (self, next),
            (Self::Packaged, Self::Submitted)
                | (Self::Packaged, Self::Failed) // submission refused
                | (Self::Submitted, Self::Confirmed)
                | (Self::Submitted, Self::Failed)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

/// One message's path through the state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAttempt {
    /// Message being relayed.
    pub message: GovernanceMessage,
    /// Bridge family used.
    pub bridge: String,
    /// Current state.
    pub state: RelayState,
    /// Set once submitted.
    pub receipt: Option<PendingReceipt>,
    /// Set once terminal.
    pub outcome: Option<RelayOutcome>,
}

impl RelayAttempt {
    /// Start an attempt in `Packaged`.
    pub fn packaged(message: GovernanceMessage, bridge: impl Into<String>) -> Self {
        Self {
            message,
            bridge: bridge.into(),
            state: RelayState::Packaged,
            receipt: None,
            outcome: None,
        }
    }

    fn transition(&mut self, next: RelayState) -> Result<(), RelayError> {
        if !self.state.can_transition_to(next) {
            return Err(RelayError::InvalidTransition {
                nonce: self.message.nonce,
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// `Packaged -> Submitted`.
    pub fn submitted(&mut self, receipt: PendingReceipt) -> Result<(), RelayError> {
        self.transition(RelayState::Submitted)?;
        self.receipt = Some(receipt);
        Ok(())
    }

    /// `Submitted -> Confirmed | Failed` from a `confirm` outcome.
    pub fn resolve(&mut self, outcome: RelayOutcome) -> Result<(), RelayError> {
        if self.state != RelayState::Submitted {
            let to = if outcome.is_confirmed() {
                RelayState::Confirmed
            } else {
                RelayState::Failed
            };
            return Err(RelayError::InvalidTransition {
                nonce: self.message.nonce,
                from: self.state,
                to,
            });
        }
        match &outcome {
            RelayOutcome::Confirmed { .. } => self.transition(RelayState::Confirmed)?,
            RelayOutcome::Failed { .. } => self.transition(RelayState::Failed)?,
        }
        self.outcome = Some(outcome);
        Ok(())
    }

    /// `Packaged | Submitted -> Failed`.
    pub fn fail(&mut self, reason: FailureReason) -> Result<(), RelayError> {
        self.transition(RelayState::Failed)?;
        self.outcome = Some(RelayOutcome::Failed { reason });
        Ok(())
    }

    /// Message nonce.
    pub fn nonce(&self) -> u64 {
        self.message.nonce
    }

    /// Whether delivery is confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.state == RelayState::Confirmed
    }

    /// Failure reason, if failed.
    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.outcome {
            Some(RelayOutcome::Failed { reason }) => Some(reason),
            _ => None,
        }
    }
}

/// Result of relaying pending messages to one satellite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReceipt {
    /// Primary network.
    pub primary: NetworkId,
    /// Satellite network.
    pub satellite: NetworkId,
    /// Bridge family used.
    pub bridge: String,
    /// Attempts in nonce order.
    pub attempts: Vec<RelayAttempt>,
}

impl RelayReceipt {
    /// Confirmed attempts.
    pub fn confirmed(&self) -> Vec<&RelayAttempt> {
        self.attempts.iter().filter(|a| a.is_confirmed()).collect()
    }

    /// Failed attempts.
    pub fn failed(&self) -> Vec<&RelayAttempt> {
        self.attempts
            .iter()
            .filter(|a| a.state == RelayState::Failed)
            .collect()
    }

    /// Whether every attempt was confirmed. True when nothing was pending.
    pub fn is_success(&self) -> bool {
        self.attempts.iter().all(RelayAttempt::is_confirmed)
    }

    /// Lowest-nonce failure.
    pub fn first_failure(&self) -> Option<(u64, &FailureReason)> {
        self.attempts
            .iter()
            .find_map(|a| a.failure().map(|reason| (a.nonce(), reason)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::TxHash;

    fn message(nonce: u64) -> GovernanceMessage {
        GovernanceMessage {
            origin: NetworkId::from("mainnet"),
            destination: NetworkId::from("polygon"),
            nonce,
            sender: None,
            payload: vec![],
            observed_block: 1,
        }
    }

    fn receipt(nonce: u64) -> PendingReceipt {
        PendingReceipt {
            bridge: "test".to_string(),
            destination: NetworkId::from("polygon"),
            nonce,
            tx_hash: TxHash::ZERO,
        }
    }

    #[test]
    fn test_valid_transitions() {
        assert!(RelayState::Packaged.can_transition_to(RelayState::Submitted));
        assert!(RelayState::Packaged.can_transition_to(RelayState::Failed));
        assert!(RelayState::Submitted.can_transition_to(RelayState::Confirmed));
        assert!(RelayState::Submitted.can_transition_to(RelayState::Failed));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!RelayState::Packaged.can_transition_to(RelayState::Confirmed));
        assert!(!RelayState::Confirmed.can_transition_to(RelayState::Failed));
        assert!(!RelayState::Failed.can_transition_to(RelayState::Submitted));
        assert!(RelayState::Confirmed.is_terminal());
        assert!(!RelayState::Submitted.is_terminal());
    }

    #[test]
    fn test_attempt_happy_path() {
        let mut attempt = RelayAttempt::packaged(message(1), "test");
        attempt.submitted(receipt(1)).unwrap();
        attempt
            .resolve(RelayOutcome::Confirmed {
                tx_hash: TxHash::ZERO,
                block_number: 5,
            })
            .unwrap();
        assert!(attempt.is_confirmed());
        assert!(attempt.failure().is_none());
    }

    #[test]
    fn test_cannot_confirm_before_submit() {
        let mut attempt = RelayAttempt::packaged(message(1), "test");
        let err = attempt
            .resolve(RelayOutcome::Confirmed {
                tx_hash: TxHash::ZERO,
                block_number: 5,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::InvalidTransition {
                from: RelayState::Packaged,
                to: RelayState::Confirmed,
                ..
            }
        ));
        assert_eq!(attempt.state, RelayState::Packaged);
    }

    #[test]
    fn test_receipt_summary() {
        let mut ok = RelayAttempt::packaged(message(1), "test");
        ok.submitted(receipt(1)).unwrap();
        ok.resolve(RelayOutcome::Confirmed {
            tx_hash: TxHash::ZERO,
            block_number: 5,
        })
        .unwrap();

        let mut bad = RelayAttempt::packaged(message(2), "test");
        bad.fail(FailureReason::InsufficientFunds).unwrap();

        let receipt = RelayReceipt {
            primary: NetworkId::from("mainnet"),
            satellite: NetworkId::from("polygon"),
            bridge: "test".to_string(),
            attempts: vec![ok, bad],
        };
        assert_eq!(receipt.confirmed().len(), 1);
        assert_eq!(receipt.failed().len(), 1);
        assert!(!receipt.is_success());
        assert_eq!(
            receipt.first_failure(),
            Some((2, &FailureReason::InsufficientFunds))
        );
    }
}
