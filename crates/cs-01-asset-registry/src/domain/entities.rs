//! # Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// A pre-existing token contract on one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Token contract address.
    pub address: Address,
    /// Token decimals, when the discovery process recorded them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

impl AssetEntry {
    /// Entry without decimals metadata.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            decimals: None,
        }
    }

    /// Attach decimals metadata.
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }
}
