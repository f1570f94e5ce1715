//! In-memory artifact store.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use shared_types::NetworkId;
use tracing::debug;

use crate::domain::{check_write, Artifact, DeployedSet, StoreError};
use crate::ports::ArtifactStore;

/// Artifact store held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    partitions: RwLock<BTreeMap<NetworkId, DeployedSet>>,
}

impl InMemoryArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of artifacts across all networks.
    pub fn len(&self) -> usize {
        self.partitions.read().values().map(DeployedSet::len).sum()
    }

    /// Whether the store holds no artifacts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn get(&self, network: &NetworkId, name: &str) -> Result<Option<Artifact>, StoreError> {
        Ok(self
            .partitions
            .read()
            .get(network)
            .and_then(|set| set.get(name))
            .cloned())
    }

    fn put(
        &self,
        network: &NetworkId,
        name: &str,
        artifact: Artifact,
        force: bool,
    ) -> Result<(), StoreError> {
        let mut partitions = self.partitions.write();
        let set = partitions.entry(network.clone()).or_default();
        check_write(network, name, &artifact, set.get(name), force)?;

        debug!("[cs-02] {}/{} -> {}", network, name, artifact.address);
        set.insert(artifact);
        Ok(())
    }

    fn all(&self, network: &NetworkId) -> Result<DeployedSet, StoreError> {
        Ok(self
            .partitions
            .read()
            .get(network)
            .cloned()
            .unwrap_or_default())
    }

    fn networks(&self) -> Result<Vec<NetworkId>, StoreError> {
        Ok(self
            .partitions
            .read()
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(network, _)| network.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    fn polygon() -> NetworkId {
        NetworkId::from("polygon")
    }

    fn artifact(name: &str, addr: u64) -> Artifact {
        Artifact::contract(polygon(), name, "Comet", Address::from_low_u64(addr))
    }

    #[test]
    fn test_put_then_get() {
        let store = InMemoryArtifactStore::new();
        store.put(&polygon(), "comet", artifact("comet", 1), false).unwrap();

        let got = store.get(&polygon(), "comet").unwrap().unwrap();
        assert_eq!(got.address, Address::from_low_u64(1));
        assert!(store.get(&NetworkId::from("mumbai"), "comet").unwrap().is_none());
    }

    #[test]
    fn test_conflict_leaves_record_untouched() {
        let store = InMemoryArtifactStore::new();
        store.put(&polygon(), "comet", artifact("comet", 1), false).unwrap();

        let err = store
            .put(&polygon(), "comet", artifact("comet", 2), false)
            .unwrap_err();
        assert!(matches!(err, StoreError::ArtifactAlreadyExists { .. }));
        assert_eq!(
            store.get(&polygon(), "comet").unwrap().unwrap().address,
            Address::from_low_u64(1)
        );
    }

    #[test]
    fn test_force_overwrites() {
        let store = InMemoryArtifactStore::new();
        store.put(&polygon(), "comet", artifact("comet", 1), false).unwrap();
        store.put(&polygon(), "comet", artifact("comet", 2), true).unwrap();

        assert_eq!(
            store.get(&polygon(), "comet").unwrap().unwrap().address,
            Address::from_low_u64(2)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_all_and_networks() {
        let store = InMemoryArtifactStore::new();
        store.put(&polygon(), "comet", artifact("comet", 1), false).unwrap();
        store.put(&polygon(), "bulker", artifact("bulker", 2), false).unwrap();

        let all = store.all(&polygon()).unwrap();
        assert_eq!(all.names(), vec!["bulker", "comet"]);
        assert_eq!(store.networks().unwrap(), vec![polygon()]);
        assert!(store.all(&NetworkId::from("mumbai")).unwrap().is_empty());
    }
}
