//! Spider File Adapter
//!
//! Reads the directory layout written by the config discovery process:
//!
//! ```text
//! <root>/
//! └── polygon/
//!     ├── assets.json              # { "USDC": { "address": "0x..", "decimals": 6 }, ... }
//!     └── usdc/
//!         └── configuration.json   # DeploySpec
//! ```

use std::path::{Path, PathBuf};

use cs_01_asset_registry::StaticAssetRegistry;
use shared_types::NetworkId;
use tracing::{debug, info};

use crate::domain::{DeployError, DeploySpec, DeploymentPlan};
use crate::ports::ConfigSource;

const SPEC_FILE: &str = "configuration.json";
const ASSETS_FILE: &str = "assets.json";

/// `ConfigSource` over a Spider output directory.
#[derive(Clone, Debug)]
pub struct FileConfigSource {
    root: PathBuf,
}

impl FileConfigSource {
    /// Read from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a deployment's spec file.
    pub fn spec_path(&self, network: &NetworkId, deployment: &str) -> PathBuf {
        self.root
            .join(network.as_str())
            .join(deployment)
            .join(SPEC_FILE)
    }

    /// Path of a network's asset table.
    pub fn assets_path(&self, network: &NetworkId) -> PathBuf {
        self.root.join(network.as_str()).join(ASSETS_FILE)
    }
}

fn config_error(path: &Path, message: impl ToString) -> DeployError {
    DeployError::Config {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

impl ConfigSource for FileConfigSource {
    fn load_spec(&self, network: &NetworkId, deployment: &str) -> Result<DeploySpec, DeployError> {
        let path = self.spec_path(network, deployment);
        let json = std::fs::read_to_string(&path).map_err(|e| config_error(&path, e))?;
        let mut spec = DeploySpec::from_json_str(&json).map_err(|e| config_error(&path, e))?;

        if spec.deployment.is_empty() {
            spec.deployment = deployment.to_string();
        } else if spec.deployment != deployment {
            return Err(config_error(
                &path,
                format!("declares deployment {}", spec.deployment),
            ));
        }

        // Surface spec errors as config errors before anyone holds a lock.
        DeploymentPlan::build(&spec)?;

        info!(
            "[cs-03] Loaded {}/{} ({} contracts, {} calls)",
            network,
            deployment,
            spec.contracts.len(),
            spec.calls.len()
        );
        Ok(spec)
    }

    fn load_assets(&self, network: &NetworkId) -> Result<StaticAssetRegistry, DeployError> {
        let path = self.assets_path(network);
        if !path.exists() {
            debug!("[cs-03] No asset table for {}", network);
            return Ok(StaticAssetRegistry::new());
        }
        Ok(StaticAssetRegistry::load(network.clone(), &path)?)
    }

    fn deployments(&self, network: &NetworkId) -> Result<Vec<String>, DeployError> {
        let dir = self.root.join(network.as_str());
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(config_error(&dir, e)),
        };

        let mut deployments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| config_error(&dir, e))?;
            if !entry.path().join(SPEC_FILE).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                deployments.push(name.to_string());
            }
        }
        deployments.sort();
        Ok(deployments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_01_asset_registry::AssetRegistry;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_loads_spec_and_fills_deployment() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "polygon/usdc/configuration.json",
            r#"{ "contracts": [{ "name": "comet", "contract": "Comet" }] }"#,
        );

        let source = FileConfigSource::new(dir.path());
        let spec = source.load_spec(&NetworkId::from("polygon"), "usdc").unwrap();
        assert_eq!(spec.deployment, "usdc");
        assert_eq!(spec.contracts[0].name, "comet");
        assert_eq!(
            source.deployments(&NetworkId::from("polygon")).unwrap(),
            vec!["usdc"]
        );
    }

    #[test]
    fn test_mismatched_deployment_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "polygon/usdc/configuration.json",
            r#"{ "deployment": "weth" }"#,
        );

        let source = FileConfigSource::new(dir.path());
        let err = source.load_spec(&NetworkId::from("polygon"), "usdc").unwrap_err();
        assert!(matches!(err, DeployError::Config { .. }));
    }

    #[test]
    fn test_missing_spec_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileConfigSource::new(dir.path());
        let err = source.load_spec(&NetworkId::from("polygon"), "usdc").unwrap_err();
        assert!(matches!(err, DeployError::Config { .. }));
        assert!(source.deployments(&NetworkId::from("polygon")).unwrap().is_empty());
    }

    #[test]
    fn test_cyclic_spec_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "polygon/loop/configuration.json",
            r#"{ "contracts": [
                { "name": "a", "contract": "A", "args": [{ "$ref": "b" }] },
                { "name": "b", "contract": "B", "args": [{ "$ref": "a" }] }
            ] }"#,
        );

        let source = FileConfigSource::new(dir.path());
        let err = source.load_spec(&NetworkId::from("polygon"), "loop").unwrap_err();
        assert!(matches!(err, DeployError::CyclicDependency { .. }));
    }

    #[test]
    fn test_loads_assets() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "polygon/assets.json",
            r#"{ "USDC": { "address": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "decimals": 6 } }"#,
        );

        let source = FileConfigSource::new(dir.path());
        let polygon = NetworkId::from("polygon");
        let registry = source.load_assets(&polygon).unwrap();
        assert!(registry.contains(&polygon, "USDC"));

        let empty = source.load_assets(&NetworkId::from("mumbai")).unwrap();
        assert!(empty.symbols(&NetworkId::from("mumbai")).is_empty());
    }
}
