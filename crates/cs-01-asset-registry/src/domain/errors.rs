//! # Domain Errors

use shared_types::NetworkId;
use thiserror::Error;

/// Asset Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No known contract for `symbol` on `network`.
    #[error("Unknown asset {symbol} on {network}")]
    UnknownAsset {
        /// Requested symbol.
        symbol: String,
        /// Network searched.
        network: NetworkId,
    },

    /// A registry file could not be read or parsed.
    #[error("Failed to load asset registry from {source_name}: {message}")]
    Parse {
        /// File path or other origin of the data.
        source_name: String,
        /// Underlying error.
        message: String,
    },
}
