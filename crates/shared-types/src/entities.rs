//! # Core Entities
//!
//! Identifiers and fixed-size on-chain values.
//!
//! - **Networks**: `NetworkId`
//! - **Chain values**: `Address` (20 bytes), `TxHash` (32 bytes)
//!
//! Fixed-size values serialize as `0x`-prefixed lowercase hex so that persisted
//! artifact files stay human-readable and diff cleanly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ParseHexError;

/// Opaque identifier of a chain/environment (e.g. `mainnet`, `polygon`).
///
/// Unique within a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    /// Create a network identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NetworkId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for NetworkId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], ParseHexError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    if digits.len() != N * 2 {
        return Err(ParseHexError::InvalidLength {
            expected: N,
            actual: digits.len() / 2,
        });
    }

    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|e| ParseHexError::InvalidHex(e.to_string()))?;
    Ok(out)
}

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Byte length of this value.
            pub const LEN: usize = $len;

            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Whether every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_fixed::<$len>(s).map(Self)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 20-byte EVM account or contract address.
    Address,
    20
);

fixed_bytes!(
    /// A 32-byte transaction hash.
    TxHash,
    32
);

impl Address {
    /// Build an address whose low-order bytes hold `value` (system addresses
    /// such as `0x...1001`).
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_roundtrip_display() {
        let addr: Address = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".parse().unwrap();
        assert_eq!(
            addr.to_string(),
            "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
        );
    }

    #[test]
    fn test_address_without_prefix() {
        let addr: Address = "0000000000000000000000000000000000001001".parse().unwrap();
        assert_eq!(addr, Address::from_low_u64(0x1001));
    }

    #[test]
    fn test_address_wrong_length_rejected() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(
            err,
            ParseHexError::InvalidLength {
                expected: 20,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_address_invalid_hex_rejected() {
        let result = "0xzz91Bca1f2de4661ED88A30C99A7a9449Aa84174".parse::<Address>();
        assert!(matches!(result, Err(ParseHexError::InvalidHex(_))));
    }

    #[test]
    fn test_tx_hash_serde_as_hex_string() {
        let hash = TxHash::new([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));

        let back: TxHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_network_id_transparent_serde() {
        let id = NetworkId::from("polygon");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"polygon\"");
        assert_eq!(id.to_string(), "polygon");
    }
}
