//! # Deploy Spec
//!
//! Declarative description of what must exist on a network after a run.
//! Produced by Spider as `configuration.json`:
//!
//! ```json
//! {
//!   "deployment": "usdc",
//!   "assets": ["USDC"],
//!   "config": { "fxChild": "0x8397..." },
//!   "contracts": [
//!     { "name": "bridgeReceiver", "contract": "PolygonBridgeReceiver", "args": [{ "$config": "fxChild" }] }
//!   ],
//!   "calls": [
//!     { "name": "initializeBridgeReceiver", "target": "bridgeReceiver", "method": "initialize", "args": [] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker key for a reference to an artifact of the same plan.
pub const REF_KEY: &str = "$ref";
/// Marker key for a registry asset.
pub const ASSET_KEY: &str = "$asset";
/// Marker key for a `config` entry.
pub const CONFIG_KEY: &str = "$config";

/// A constructor or call parameter.
///
/// Serialized as plain JSON: `{"$ref": "comet"}`, `{"$asset": "USDC"}` and
/// `{"$config": "timelockDelay"}` are references, arrays and objects recurse,
/// anything else is a literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ParamValue {
    /// Address of an artifact of this plan.
    Ref(String),
    /// Address of a pre-existing asset.
    Asset(String),
    /// Value of a `config` entry.
    Config(String),
    /// Array of parameters.
    Array(Vec<ParamValue>),
    /// Object of parameters (e.g. a Comet configuration struct).
    Object(BTreeMap<String, ParamValue>),
    /// Anything else.
    Literal(Value),
}

impl ParamValue {
    /// Reference to artifact `name`.
    pub fn reference(name: impl Into<String>) -> Self {
        ParamValue::Ref(name.into())
    }

    /// Reference to registry asset `symbol`.
    pub fn asset(symbol: impl Into<String>) -> Self {
        ParamValue::Asset(symbol.into())
    }

    /// Reference to config entry `key`.
    pub fn config(key: impl Into<String>) -> Self {
        ParamValue::Config(key.into())
    }

    /// Literal JSON value.
    pub fn literal(value: impl Into<Value>) -> Self {
        ParamValue::Literal(value.into())
    }

    /// Visit this value and every nested value, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ParamValue)) {
        visit(self);
        match self {
            ParamValue::Array(items) => items.iter().for_each(|item| item.walk(visit)),
            ParamValue::Object(fields) => fields.values().for_each(|item| item.walk(visit)),
            _ => {}
        }
    }

    /// Artifact names referenced anywhere inside this value.
    pub fn refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.walk(&mut |v| {
            if let ParamValue::Ref(name) = v {
                out.push(name.as_str());
            }
        });
        out
    }

    /// Asset symbols referenced anywhere inside this value.
    pub fn assets(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.walk(&mut |v| {
            if let ParamValue::Asset(symbol) = v {
                out.push(symbol.as_str());
            }
        });
        out
    }

    /// Config keys referenced anywhere inside this value.
    pub fn config_keys(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.walk(&mut |v| {
            if let ParamValue::Config(key) = v {
                out.push(key.as_str());
            }
        });
        out
    }
}

fn marker(map: &serde_json::Map<String, Value>) -> Option<ParamValue> {
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    let target = value.as_str()?.to_string();
    match key.as_str() {
        REF_KEY => Some(ParamValue::Ref(target)),
        ASSET_KEY => Some(ParamValue::Asset(target)),
        CONFIG_KEY => Some(ParamValue::Config(target)),
        _ => None,
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ParamValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => match marker(&map) {
                Some(reference) => reference,
                None => ParamValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
            },
            other => ParamValue::Literal(other),
        }
    }
}

impl From<ParamValue> for Value {
    fn from(param: ParamValue) -> Self {
        let tagged = |key: &str, target: String| {
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), Value::String(target));
            Value::Object(map)
        };
        match param {
            ParamValue::Ref(name) => tagged(REF_KEY, name),
            ParamValue::Asset(symbol) => tagged(ASSET_KEY, symbol),
            ParamValue::Config(key) => tagged(CONFIG_KEY, key),
            ParamValue::Array(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            ParamValue::Object(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            ParamValue::Literal(value) => value,
        }
    }
}

/// A contract to instantiate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    /// Logical artifact name, unique per network.
    pub name: String,
    /// Contract type.
    pub contract: String,
    /// Constructor parameters.
    #[serde(default)]
    pub args: Vec<ParamValue>,
    /// Extra ordering edges not expressed through `$ref`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ContractSpec {
    /// Contract `name` of type `contract` with no arguments.
    pub fn new(name: impl Into<String>, contract: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contract: contract.into(),
            args: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    /// Append a constructor parameter.
    pub fn arg(mut self, arg: ParamValue) -> Self {
        self.args.push(arg);
        self
    }

    /// Add an explicit ordering edge.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }
}

/// A one-off call on a contract of this plan (e.g. `initialize`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallSpec {
    /// Logical name of the invocation.
    pub name: String,
    /// Contract of this plan to call.
    pub target: String,
    /// Method name.
    pub method: String,
    /// Call parameters.
    #[serde(default)]
    pub args: Vec<ParamValue>,
    /// Extra ordering edges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl CallSpec {
    /// Call `target.method()` recorded under `name`.
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            method: method.into(),
            args: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    /// Append a call parameter.
    pub fn arg(mut self, arg: ParamValue) -> Self {
        self.args.push(arg);
        self
    }

    /// Add an explicit ordering edge.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }
}

/// Declarative deployment for one network. Immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploySpec {
    /// Deployment name (e.g. `usdc`).
    #[serde(default)]
    pub deployment: String,
    /// Pre-existing assets to bind, by symbol.
    #[serde(default)]
    pub assets: Vec<String>,
    /// Network-specific configuration (bridge addresses, delays, ...).
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
    /// Contracts to instantiate, in declaration order.
    #[serde(default)]
    pub contracts: Vec<ContractSpec>,
    /// Calls to perform, in declaration order.
    #[serde(default)]
    pub calls: Vec<CallSpec>,
}

impl DeploySpec {
    /// Empty spec for `deployment`.
    pub fn new(deployment: impl Into<String>) -> Self {
        Self {
            deployment: deployment.into(),
            ..Default::default()
        }
    }

    /// Parse a `configuration.json` document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Require a pre-existing asset.
    pub fn with_asset(mut self, symbol: impl Into<String>) -> Self {
        self.assets.push(symbol.into());
        self
    }

    /// Set a config entry.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Declare a contract.
    pub fn with_contract(mut self, contract: ContractSpec) -> Self {
        self.contracts.push(contract);
        self
    }

    /// Declare a call.
    pub fn with_call(mut self, call: CallSpec) -> Self {
        self.calls.push(call);
        self
    }

    /// Number of declared steps.
    pub fn step_count(&self) -> usize {
        self.contracts.len() + self.calls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_markers_parse() {
        let param: ParamValue = serde_json::from_value(json!({
            "governor": { "$ref": "localTimelock" },
            "baseToken": { "$asset": "USDC" },
            "delay": { "$config": "timelockDelay" },
            "assets": [{ "$asset": "WETH" }, 18],
            "name": "Compound USDC"
        }))
        .unwrap();

        assert_eq!(param.refs(), vec!["localTimelock"]);
        assert_eq!(param.assets(), vec!["WETH", "USDC"]);
        assert_eq!(param.config_keys(), vec!["timelockDelay"]);
    }

    #[test]
    fn test_marker_needs_single_string_key() {
        let two_keys: ParamValue =
            serde_json::from_value(json!({ "$ref": "a", "other": 1 })).unwrap();
        assert!(matches!(two_keys, ParamValue::Object(_)));
        assert!(two_keys.refs().is_empty());

        let non_string: ParamValue = serde_json::from_value(json!({ "$ref": 3 })).unwrap();
        assert!(matches!(non_string, ParamValue::Object(_)));
    }

    #[test]
    fn test_param_serializes_back_to_markers() {
        let param = ParamValue::Array(vec![
            ParamValue::reference("comet"),
            ParamValue::literal(172_800),
        ]);
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!([{ "$ref": "comet" }, 172800])
        );
    }

    #[test]
    fn test_spec_parses_with_defaults() {
        let spec = DeploySpec::from_json_str(
            r#"{
                "contracts": [{ "name": "bridgeReceiver", "contract": "PolygonBridgeReceiver" }],
                "calls": [{ "name": "init", "target": "bridgeReceiver", "method": "initialize" }]
            }"#,
        )
        .unwrap();

        assert_eq!(spec.deployment, "");
        assert!(spec.assets.is_empty());
        assert_eq!(spec.step_count(), 2);
        assert!(spec.contracts[0].args.is_empty());
        assert!(spec.calls[0].depends_on.is_empty());
    }
}
