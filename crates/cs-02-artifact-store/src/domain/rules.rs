//! # Write Rules
//!
//! Shared by every adapter so that in-memory and file-backed stores accept
//! and reject exactly the same writes.

use shared_types::NetworkId;

use super::entities::Artifact;
use super::errors::StoreError;

/// Validate a `put(network, name, artifact, force)` against the current
/// record at that key.
pub fn check_write(
    network: &NetworkId,
    name: &str,
    artifact: &Artifact,
    existing: Option<&Artifact>,
    force: bool,
) -> Result<(), StoreError> {
    let invalid = |reason: String| StoreError::InvalidRecord {
        network: network.clone(),
        name: name.to_string(),
        reason,
    };

    if artifact.name != name {
        return Err(invalid(format!("record is named {}", artifact.name)));
    }
    if &artifact.network != network {
        return Err(invalid(format!("record belongs to {}", artifact.network)));
    }
    if artifact.is_asset() {
        return Err(invalid("asset bindings are not persisted".to_string()));
    }

    if existing.is_some() && !force {
        return Err(StoreError::ArtifactAlreadyExists {
            network: network.clone(),
            name: name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    fn polygon() -> NetworkId {
        NetworkId::from("polygon")
    }

    fn comet() -> Artifact {
        Artifact::contract(polygon(), "comet", "Comet", Address::from_low_u64(1))
    }

    #[test]
    fn test_free_key_accepted() {
        assert!(check_write(&polygon(), "comet", &comet(), None, false).is_ok());
    }

    #[test]
    fn test_occupied_key_requires_force() {
        let existing = comet();
        let err = check_write(&polygon(), "comet", &comet(), Some(&existing), false).unwrap_err();
        assert!(matches!(err, StoreError::ArtifactAlreadyExists { .. }));
        assert!(check_write(&polygon(), "comet", &comet(), Some(&existing), true).is_ok());
    }

    #[test]
    fn test_mismatched_key_rejected() {
        let err = check_write(&polygon(), "bulker", &comet(), None, false).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { .. }));

        let err =
            check_write(&NetworkId::from("mumbai"), "comet", &comet(), None, false).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { .. }));
    }

    #[test]
    fn test_asset_binding_rejected() {
        let usdc = Artifact::asset(polygon(), "USDC", Address::from_low_u64(2));
        let err = check_write(&polygon(), "USDC", &usdc, None, true).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { .. }));
    }
}
