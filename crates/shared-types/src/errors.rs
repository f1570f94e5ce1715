//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

use crate::entities::{NetworkId, TxHash};

/// Errors returned by a [`ChainClient`](crate::ChainClient).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Transport or node-side failure.
    #[error("RPC error on {network}: {message}")]
    Rpc { network: NetworkId, message: String },

    /// The node has no record of this transaction.
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(TxHash),

    /// The sending account cannot pay for the transaction.
    #[error("Insufficient funds on {network} for {operation}")]
    InsufficientFunds { network: NetworkId, operation: String },

    /// The node refused the transaction before inclusion.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// A client bound to one network was used for another.
    #[error("Network mismatch: client is on {actual}, expected {expected}")]
    NetworkMismatch { expected: NetworkId, actual: NetworkId },
}

/// Errors parsing fixed-size hex values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseHexError {
    /// Wrong number of bytes.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Non-hex characters.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
