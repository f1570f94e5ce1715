//! # Ports Module
//!
//! The store is consulted and mutated only through [`ArtifactStore`].

use shared_types::NetworkId;

use crate::domain::{Artifact, DeployedSet, StoreError};

/// Per-network artifact persistence - outbound port of the orchestrator.
///
/// Implementations use interior locking and are shared as
/// `Arc<dyn ArtifactStore>`. Reads always return the latest committed write.
pub trait ArtifactStore: Send + Sync {
    /// Artifact at `(network, name)`, if any.
    fn get(&self, network: &NetworkId, name: &str) -> Result<Option<Artifact>, StoreError>;

    /// Write `artifact` at `(network, name)`.
    ///
    /// Fails with `ArtifactAlreadyExists` if the key is occupied and `force`
    /// is false; the existing record is left untouched.
    fn put(
        &self,
        network: &NetworkId,
        name: &str,
        artifact: Artifact,
        force: bool,
    ) -> Result<(), StoreError>;

    /// Every artifact of `network`.
    fn all(&self, network: &NetworkId) -> Result<DeployedSet, StoreError>;

    /// Networks with at least one artifact, sorted.
    fn networks(&self) -> Result<Vec<NetworkId>, StoreError>;

    /// Whether `(network, name)` is occupied.
    fn contains(&self, network: &NetworkId, name: &str) -> Result<bool, StoreError> {
        Ok(self.get(network, name)?.is_some())
    }
}
