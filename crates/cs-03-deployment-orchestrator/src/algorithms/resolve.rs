//! Parameter resolution.
//!
//! Turns `ParamValue`s into concrete JSON: `$ref` and `$asset` become
//! `0x`-prefixed address strings, `$config` is replaced by the config value.

use std::collections::BTreeMap;

use serde_json::Value;
use shared_types::{Address, NetworkId};

use crate::domain::{DeployError, ParamValue};

/// Values available to the step being resolved.
pub struct Bindings<'a> {
    network: &'a NetworkId,
    artifacts: &'a BTreeMap<String, Address>,
    assets: &'a BTreeMap<String, Address>,
    config: &'a BTreeMap<String, Value>,
}

impl<'a> Bindings<'a> {
    /// Bind produced artifacts, resolved assets and config.
    pub fn new(
        network: &'a NetworkId,
        artifacts: &'a BTreeMap<String, Address>,
        assets: &'a BTreeMap<String, Address>,
        config: &'a BTreeMap<String, Value>,
    ) -> Self {
        Self {
            network,
            artifacts,
            assets,
            config,
        }
    }

    /// Address of artifact `name` produced earlier in this run.
    pub fn artifact(&self, step: &str, name: &str) -> Result<Address, DeployError> {
        self.artifacts
            .get(name)
            .copied()
            .ok_or_else(|| DeployError::UnresolvedReference {
                step: step.to_string(),
                reference: name.to_string(),
            })
    }

    /// Resolve one parameter of `step`.
    pub fn resolve(&self, step: &str, param: &ParamValue) -> Result<Value, DeployError> {
        match param {
            ParamValue::Ref(name) => Ok(Value::String(self.artifact(step, name)?.to_string())),
            ParamValue::Asset(symbol) => self
                .assets
                .get(symbol)
                .map(|address| Value::String(address.to_string()))
                .ok_or_else(|| DeployError::UnknownAsset {
                    symbol: symbol.clone(),
                    network: self.network.clone(),
                }),
            ParamValue::Config(key) => {
                self.config
                    .get(key)
                    .cloned()
                    .ok_or_else(|| DeployError::MissingConfig {
                        step: step.to_string(),
                        key: key.clone(),
                    })
            }
            ParamValue::Array(items) => items
                .iter()
                .map(|item| self.resolve(step, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            ParamValue::Object(fields) => fields
                .iter()
                .map(|(key, item)| Ok((key.clone(), self.resolve(step, item)?)))
                .collect::<Result<serde_json::Map<_, _>, DeployError>>()
                .map(Value::Object),
            ParamValue::Literal(value) => Ok(value.clone()),
        }
    }

    /// Resolve an argument list.
    pub fn resolve_all(&self, step: &str, params: &[ParamValue]) -> Result<Vec<Value>, DeployError> {
        params.iter().map(|param| self.resolve(step, param)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolves_nested_references() {
        let network = NetworkId::from("polygon");
        let artifacts = BTreeMap::from([("timelock".to_string(), Address::from_low_u64(0x71))]);
        let assets = BTreeMap::from([("USDC".to_string(), Address::from_low_u64(0xaa))]);
        let config = BTreeMap::from([("delay".to_string(), json!(172800))]);
        let bindings = Bindings::new(&network, &artifacts, &assets, &config);

        let param: ParamValue = serde_json::from_value(json!({
            "governor": { "$ref": "timelock" },
            "baseToken": { "$asset": "USDC" },
            "delay": { "$config": "delay" },
            "tags": ["x", { "$asset": "USDC" }]
        }))
        .unwrap();

        assert_eq!(
            bindings.resolve("comet", &param).unwrap(),
            json!({
                "governor": "0x0000000000000000000000000000000000000071",
                "baseToken": "0x00000000000000000000000000000000000000aa",
                "delay": 172800,
                "tags": ["x", "0x00000000000000000000000000000000000000aa"]
            })
        );
    }

    #[test]
    fn test_missing_bindings_fail() {
        let network = NetworkId::from("polygon");
        let empty_addresses = BTreeMap::new();
        let empty_config = BTreeMap::new();
        let bindings = Bindings::new(&network, &empty_addresses, &empty_addresses, &empty_config);

        assert!(matches!(
            bindings.resolve("comet", &ParamValue::reference("timelock")),
            Err(DeployError::UnresolvedReference { .. })
        ));
        assert!(matches!(
            bindings.resolve("comet", &ParamValue::asset("USDC")),
            Err(DeployError::UnknownAsset { .. })
        ));
        assert!(matches!(
            bindings.resolve("comet", &ParamValue::config("delay")),
            Err(DeployError::MissingConfig { .. })
        ));
    }
}
