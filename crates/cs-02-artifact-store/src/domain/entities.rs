//! # Domain Entities
//!
//! - `Artifact`: one deployed, invoked or bound on-chain entity
//! - `CreationRecord`: how and when it was created
//! - `DeployedSet`: all artifacts of one network, keyed by logical name

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use shared_types::{Address, NetworkId, TxHash};

/// What an artifact is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A contract instantiated by this deployer.
    Contract {
        /// Contract type (e.g. `Comet`).
        contract: String,
    },
    /// A completed one-off call on an artifact (e.g. `initialize`).
    Invocation {
        /// Method that was called.
        method: String,
    },
    /// A pre-existing asset bound from the registry.
    Asset {
        /// Registry symbol.
        symbol: String,
    },
}

/// Creation transaction of an artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationRecord {
    /// Creating transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Unix seconds when the record was written.
    pub created_at: u64,
}

impl CreationRecord {
    /// Record a creation observed now.
    pub fn now(tx_hash: TxHash, block_number: u64) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            tx_hash,
            block_number,
            created_at,
        }
    }
}

/// A deployed or reused on-chain entity.
///
/// For invocations `address` is the called contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Logical name, unique per network.
    pub name: String,
    /// Network the artifact lives on.
    pub network: NetworkId,
    /// On-chain address.
    pub address: Address,
    /// Contract, invocation or asset binding.
    #[serde(flatten)]
    pub kind: ArtifactKind,
    /// Creation transaction. `None` for asset bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<CreationRecord>,
    /// Resolved constructor or call arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<serde_json::Value>,
}

impl Artifact {
    /// A contract instance.
    pub fn contract(
        network: NetworkId,
        name: impl Into<String>,
        contract: impl Into<String>,
        address: Address,
    ) -> Self {
        Self::with_kind(
            network,
            name,
            address,
            ArtifactKind::Contract {
                contract: contract.into(),
            },
        )
    }

    /// A completed call on `target`.
    pub fn invocation(
        network: NetworkId,
        name: impl Into<String>,
        method: impl Into<String>,
        target: Address,
    ) -> Self {
        Self::with_kind(
            network,
            name,
            target,
            ArtifactKind::Invocation {
                method: method.into(),
            },
        )
    }

    /// A registry binding. The logical name is the symbol.
    pub fn asset(network: NetworkId, symbol: impl Into<String>, address: Address) -> Self {
        let symbol = symbol.into();
        Self::with_kind(
            network,
            symbol.clone(),
            address,
            ArtifactKind::Asset { symbol },
        )
    }

    fn with_kind(
        network: NetworkId,
        name: impl Into<String>,
        address: Address,
        kind: ArtifactKind,
    ) -> Self {
        Self {
            name: name.into(),
            network,
            address,
            kind,
            creation: None,
            args: Vec::new(),
        }
    }

    /// Attach the creation transaction.
    pub fn with_creation(mut self, creation: CreationRecord) -> Self {
        self.creation = Some(creation);
        self
    }

    /// Attach resolved arguments.
    pub fn with_args(mut self, args: Vec<serde_json::Value>) -> Self {
        self.args = args;
        self
    }

    /// Whether this is a registry binding.
    pub fn is_asset(&self) -> bool {
        matches!(self.kind, ArtifactKind::Asset { .. })
    }

    /// Creating transaction, if any.
    pub fn tx_hash(&self) -> Option<TxHash> {
        self.creation.as_ref().map(|c| c.tx_hash)
    }
}

/// All artifacts of one network, ordered by logical name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployedSet {
    artifacts: BTreeMap<String, Artifact>,
}

impl DeployedSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifact named `name`.
    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.get(name)
    }

    /// Address of the artifact named `name`.
    pub fn address(&self, name: &str) -> Option<Address> {
        self.get(name).map(|a| a.address)
    }

    /// Insert under the artifact's own name, returning the replaced entry.
    pub fn insert(&mut self, artifact: Artifact) -> Option<Artifact> {
        self.artifacts.insert(artifact.name.clone(), artifact)
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }

    /// Logical names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.artifacts.keys().map(String::as_str).collect()
    }

    /// Number of artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }
}

impl FromIterator<Artifact> for DeployedSet {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        let mut set = Self::new();
        for artifact in iter {
            set.insert(artifact);
        }
        set
    }
}

impl IntoIterator for DeployedSet {
    type Item = Artifact;
    type IntoIter = std::collections::btree_map::IntoValues<String, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_values()
    }
}
