//! # Network Locking
//!
//! Prevents two processes from running a deployment plan for the same
//! network at the same time. Without it both could see a key as free and
//! submit duplicate creation transactions.
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use shared_types::NetworkId;
use tracing::{debug, warn};

use crate::domain::StoreError;

/// Exclusive lock on one network's partition directory.
///
/// Held for the duration of a deployment run and released on drop.
///
/// ```ignore
/// let _lock = NetworkLock::acquire(Path::new("./data"), &network)?;
/// // run the plan
/// ```
#[derive(Debug)]
pub struct NetworkLock {
    file: File,
    path: PathBuf,
    network: NetworkId,
}

impl NetworkLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquire the lock for `network` under `root` without blocking.
    ///
    /// Returns `StoreError::Locked` if another holder exists.
    pub fn acquire(root: &Path, network: &NetworkId) -> Result<Self, StoreError> {
        let dir = root.join(network.as_str());
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let path = dir.join(Self::LOCK_FILE);

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        if file.try_lock_exclusive().is_err() {
            warn!("[cs-02] {} is locked ({})", network, path.display());
            return Err(StoreError::Locked {
                network: network.clone(),
                path,
            });
        }

        file.set_len(0).map_err(|e| StoreError::io(&path, e))?;
        writeln!(file, "{}", std::process::id()).map_err(|e| StoreError::io(&path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&path, e))?;

        debug!("[cs-02] Locked {}", network);
        Ok(Self {
            file,
            path,
            network: network.clone(),
        })
    }

    /// Locked network.
    pub fn network(&self) -> &NetworkId {
        &self.network
    }

    /// Lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for NetworkLock {
    fn drop(&mut self) {
        match self.file.unlock() {
            Ok(()) => debug!("[cs-02] Unlocked {}", self.network),
            Err(e) => warn!(
                "[cs-02] Failed to unlock {} ({}): {}",
                self.network,
                self.path.display(),
                e
            ),
        }
    }
}
