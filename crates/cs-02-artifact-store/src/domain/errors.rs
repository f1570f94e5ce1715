//! # Domain Errors

use std::path::PathBuf;

use shared_types::NetworkId;
use thiserror::Error;

/// Artifact Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Write to an occupied key without `force`.
    #[error("Artifact {name} already exists on {network}")]
    ArtifactAlreadyExists {
        /// Network of the key.
        network: NetworkId,
        /// Logical name of the key.
        name: String,
    },

    /// The record does not belong under the key it was written to.
    #[error("Invalid artifact record {name} on {network}: {reason}")]
    InvalidRecord {
        /// Network of the key.
        network: NetworkId,
        /// Logical name of the key.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Filesystem failure.
    #[error("I/O error at {}: {message}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// A partition file exists but cannot be decoded.
    #[error("Corrupt artifact file {}: {message}", path.display())]
    Corrupt {
        /// Partition file.
        path: PathBuf,
        /// Decoder error.
        message: String,
    },

    /// Another process holds the network lock.
    #[error("Network {network} is locked by another deployment ({})", path.display())]
    Locked {
        /// Locked network.
        network: NetworkId,
        /// Lock file.
        path: PathBuf,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_message() {
        let err = StoreError::ArtifactAlreadyExists {
            network: NetworkId::from("polygon"),
            name: "comet".to_string(),
        };
        assert_eq!(err.to_string(), "Artifact comet already exists on polygon");
    }

    #[test]
    fn test_locked_message_includes_path() {
        let err = StoreError::Locked {
            network: NetworkId::from("polygon"),
            path: PathBuf::from("/data/polygon/LOCK"),
        };
        assert!(err.to_string().contains("/data/polygon/LOCK"));
    }
}
