//! File-backed artifact store.
//!
//! Layout:
//!
//! ```text
//! <root>/
//! ├── polygon/
//! │   ├── artifacts.json
//! │   └── LOCK            # held by NetworkLock during a run
//! └── mumbai/
//!     └── artifacts.json
//! ```
//!
//! Each partition is a pretty-printed JSON object keyed by logical name.
//! Every `put` rewrites the partition atomically via temp file, fsync and
//! rename, so a crash mid-write leaves the previous document intact.
//!
//! Several processes may share one root. Cached partitions are tagged with
//! the file's modification time and length and reloaded when either
//! changes; `put` always checks conflicts against the file on disk.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::RwLock;
use shared_types::NetworkId;
use tracing::{debug, info};

use crate::domain::{check_write, Artifact, DeployedSet, StoreError};
use crate::ports::ArtifactStore;

const PARTITION_FILE: &str = "artifacts.json";

/// Identity of a partition file on disk. `None` when the file is absent.
type FileStamp = Option<(SystemTime, u64)>;

struct CachedPartition {
    stamp: FileStamp,
    set: DeployedSet,
}

/// Artifact store persisted under a root directory.
pub struct FileArtifactStore {
    root: PathBuf,
    /// Lazily loaded partitions, revalidated against the file on every read.
    cache: RwLock<HashMap<NetworkId, CachedPartition>>,
}

impl FileArtifactStore {
    /// Open a store rooted at `root`. Nothing is read until first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!("[cs-02] Artifact store at {}", root.display());
        Self {
            root,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the partition file for `network`.
    pub fn partition_path(&self, network: &NetworkId) -> PathBuf {
        self.root.join(network.as_str()).join(PARTITION_FILE)
    }

    fn stamp(&self, network: &NetworkId) -> Result<FileStamp, StoreError> {
        let path = self.partition_path(network);
        match std::fs::metadata(&path) {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| StoreError::io(&path, e))?;
                Ok(Some((modified, meta.len())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn read_partition(&self, network: &NetworkId) -> Result<DeployedSet, StoreError> {
        let path = self.partition_path(network);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("[cs-02] No partition for {} yet", network);
                return Ok(DeployedSet::new());
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let set: DeployedSet = serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if let Some(stray) = set
            .iter()
            .find(|a| &a.network != network || a.is_asset())
        {
            return Err(StoreError::Corrupt {
                path,
                message: format!("record {} does not belong to {}", stray.name, network),
            });
        }

        debug!("[cs-02] Loaded {} artifacts for {}", set.len(), network);
        Ok(set)
    }

    fn write_partition(&self, network: &NetworkId, set: &DeployedSet) -> Result<(), StoreError> {
        let path = self.partition_path(network);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(set).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let temp_path = path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(|e| StoreError::io(&temp_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| StoreError::io(&temp_path, e))?;
        file.write_all(b"\n")
            .map_err(|e| StoreError::io(&temp_path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&temp_path, e))?;

        std::fs::rename(&temp_path, &path).map_err(|e| StoreError::io(&path, e))
    }

    /// Run `f` on the partition, reloading it if the file changed since it
    /// was cached.
    fn with_partition<T>(
        &self,
        network: &NetworkId,
        f: impl FnOnce(&DeployedSet) -> T,
    ) -> Result<T, StoreError> {
        let stamp = self.stamp(network)?;
        if let Some(cached) = self.cache.read().get(network) {
            if cached.stamp == stamp {
                return Ok(f(&cached.set));
            }
        }

        // Stamp taken before the read: a rename in between forces another reload.
        let mut cache = self.cache.write();
        let set = self.read_partition(network)?;
        let result = f(&set);
        cache.insert(network.clone(), CachedPartition { stamp, set });
        Ok(result)
    }
}

impl ArtifactStore for FileArtifactStore {
    fn get(&self, network: &NetworkId, name: &str) -> Result<Option<Artifact>, StoreError> {
        self.with_partition(network, |set| set.get(name).cloned())
    }

    fn put(
        &self,
        network: &NetworkId,
        name: &str,
        artifact: Artifact,
        force: bool,
    ) -> Result<(), StoreError> {
        let mut cache = self.cache.write();
        // Another process may have committed since the cache was filled.
        let mut set = self.read_partition(network)?;

        check_write(network, name, &artifact, set.get(name), force)?;

        let address = artifact.address;
        set.insert(artifact);
        self.write_partition(network, &set)?;
        cache.remove(network);

        info!(
            "[cs-02] Persisted {}/{} at {}{}",
            network,
            name,
            address,
            if force { " (forced)" } else { "" }
        );
        Ok(())
    }

    fn all(&self, network: &NetworkId) -> Result<DeployedSet, StoreError> {
        self.with_partition(network, DeployedSet::clone)
    }

    fn networks(&self) -> Result<Vec<NetworkId>, StoreError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut networks = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            if !entry.path().join(PARTITION_FILE).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                networks.push(NetworkId::from(name));
            }
        }
        networks.sort();
        Ok(networks)
    }
}
