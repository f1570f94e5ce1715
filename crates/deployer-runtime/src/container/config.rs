//! # Deployer Configuration
//!
//! One JSON document plus `CS_*` environment overrides. Every field has a
//! default, so an empty document (or none at all) is a valid configuration.
//!
//! ```json
//! {
//!   "governance_network": "mainnet",
//!   "networks": {
//!     "polygon": { "confirmations": 2, "confirmation_timeout_secs": 600,
//!                  "contracts": { "fxChild": "0x8397..." } }
//!   },
//!   "storage": { "data_dir": "./data", "deployments_dir": "./deployments" },
//!   "relay": { "poll_interval_ms": 5000, "confirmation_timeout_secs": 1800 }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cs_03_deployment_orchestrator::NetworkSettings;
use cs_04_relay_dispatcher::RelayConfig;
use serde::{Deserialize, Serialize};
use shared_types::{Address, NetworkId};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// The configuration file is not valid JSON for this schema.
    #[error("Invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// An environment override has an unusable value.
    #[error("Invalid value {value:?} for {var}")]
    InvalidOverride { var: String, value: String },

    /// The governance network has no profile, so relays cannot find its
    /// bridge contracts.
    #[error("Governance network {0} has no network profile")]
    UnknownGovernanceNetwork(NetworkId),

    /// A timeout or interval is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(String),
}

/// Complete deployer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployerConfig {
    /// Network where governance proposals are approved.
    pub governance_network: NetworkId,
    /// Per-network settings.
    pub networks: BTreeMap<NetworkId, NetworkProfile>,
    /// Storage locations.
    pub storage: StorageConfig,
    /// Relay tuning.
    pub relay: RelaySettings,
}

/// Settings for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkProfile {
    /// Confirmations to wait for after each deployment transaction.
    pub confirmations: u64,
    /// Bound on each confirmation wait.
    pub confirmation_timeout_secs: u64,
    /// Well-known contracts (bridge endpoints, governor timelock).
    pub contracts: BTreeMap<String, Address>,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Artifact Store root.
    pub data_dir: PathBuf,
    /// Spider output root.
    pub deployments_dir: PathBuf,
}

/// Relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Interval between ordering re-checks.
    pub poll_interval_ms: u64,
    /// Bound on each relay confirmation wait.
    pub confirmation_timeout_secs: u64,
    /// Finality overrides per network.
    pub confirmations: BTreeMap<NetworkId, u64>,
}

fn well_known(pairs: &[(&str, &str)]) -> BTreeMap<String, Address> {
    pairs
        .iter()
        .filter_map(|(name, address)| Some((name.to_string(), address.parse().ok()?)))
        .collect()
}

impl Default for DeployerConfig {
    fn default() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(
            NetworkId::from("mainnet"),
            NetworkProfile {
                contracts: well_known(&[
                    ("stateSender", "0x28e4F3a7f651294B9564800b2D01f35189A5bFbE"),
                    ("fxRoot", "0xfe5e5D361b2ad62c541bAb87C45a0B9B018389a2"),
                    ("timelock", "0x6d903f6003cca6255D85CcA4D3B5E5146dC33925"),
                ]),
                ..NetworkProfile::default()
            },
        );
        networks.insert(
            NetworkId::from("goerli"),
            NetworkProfile {
                contracts: well_known(&[(
                    "stateSender",
                    "0xEAa852323826C71cd7920C3b4c007184234c3945",
                )]),
                ..NetworkProfile::default()
            },
        );
        networks.insert(
            NetworkId::from("polygon"),
            NetworkProfile {
                contracts: well_known(&[(
                    "fxChild",
                    "0x8397259c983751DAf40400790063935a11afa28a",
                )]),
                ..NetworkProfile::default()
            },
        );
        networks.insert(
            NetworkId::from("mumbai"),
            NetworkProfile {
                contracts: well_known(&[(
                    "fxChild",
                    "0xCf73231F28B7331BBe3124B907840A94851f9f11",
                )]),
                ..NetworkProfile::default()
            },
        );

        Self {
            governance_network: NetworkId::from("mainnet"),
            networks,
            storage: StorageConfig::default(),
            relay: RelaySettings::default(),
        }
    }
}

impl Default for NetworkProfile {
    fn default() -> Self {
        Self {
            confirmations: 1,
            confirmation_timeout_secs: 300,
            contracts: BTreeMap::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            deployments_dir: PathBuf::from("./deployments"),
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: RelayConfig::DEFAULT_POLL_INTERVAL.as_millis() as u64,
            confirmation_timeout_secs: RelayConfig::DEFAULT_CONFIRMATION_TIMEOUT.as_secs(),
            confirmations: BTreeMap::new(),
        }
    }
}

impl NetworkProfile {
    /// Orchestrator settings for this profile.
    pub fn settings(&self) -> NetworkSettings {
        self.contracts.iter().fold(
            NetworkSettings::default()
                .with_confirmations(self.confirmations)
                .with_timeout(Duration::from_secs(self.confirmation_timeout_secs)),
            |settings, (name, address)| settings.with_contract(name.clone(), *address),
        )
    }
}

impl RelaySettings {
    /// Relay tuning for the dispatcher's strategies.
    pub fn relay_config(&self) -> RelayConfig {
        let config = RelayConfig::default()
            .with_timeout(Duration::from_secs(self.confirmation_timeout_secs))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms));
        self.confirmations
            .iter()
            .fold(config, |config, (network, n)| {
                config.with_confirmations(network.clone(), *n)
            })
    }
}

fn parse_override<T: std::str::FromStr>(var: &str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            var: var.to_string(),
            value,
        })
}

impl DeployerConfig {
    /// Parse a configuration document.
    pub fn from_json_str(json: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json, path)
    }

    /// Load from `CS_CONFIG` (or defaults), apply `CS_*` overrides and
    /// validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("CS_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up through `lookup`.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `CS_GOVERNANCE_NETWORK` | `governance_network` |
    /// | `CS_DATA_DIR` | `storage.data_dir` |
    /// | `CS_DEPLOYMENTS_DIR` | `storage.deployments_dir` |
    /// | `CS_RELAY_POLL_INTERVAL_MS` | `relay.poll_interval_ms` |
    /// | `CS_RELAY_TIMEOUT_SECS` | `relay.confirmation_timeout_secs` |
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(network) = lookup("CS_GOVERNANCE_NETWORK") {
            self.governance_network = NetworkId::from(network);
        }
        if let Some(dir) = lookup("CS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("CS_DEPLOYMENTS_DIR") {
            self.storage.deployments_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("CS_RELAY_POLL_INTERVAL_MS") {
            self.relay.poll_interval_ms = parse_override("CS_RELAY_POLL_INTERVAL_MS", value)?;
        }
        if let Some(value) = lookup("CS_RELAY_TIMEOUT_SECS") {
            self.relay.confirmation_timeout_secs = parse_override("CS_RELAY_TIMEOUT_SECS", value)?;
        }
        Ok(())
    }

    /// Reject configurations the runtime cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.networks.contains_key(&self.governance_network) {
            return Err(ConfigError::UnknownGovernanceNetwork(
                self.governance_network.clone(),
            ));
        }
        for (network, profile) in &self.networks {
            if profile.confirmation_timeout_secs == 0 {
                return Err(ConfigError::ZeroDuration(format!(
                    "networks.{}.confirmation_timeout_secs",
                    network
                )));
            }
        }
        if self.relay.confirmation_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration(
                "relay.confirmation_timeout_secs".to_string(),
            ));
        }
        if self.relay.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("relay.poll_interval_ms".to_string()));
        }
        Ok(())
    }

    /// Orchestrator settings for `network`; defaults when it has no profile.
    pub fn network_settings(&self, network: &NetworkId) -> NetworkSettings {
        self.networks
            .get(network)
            .map(NetworkProfile::settings)
            .unwrap_or_default()
    }
}
