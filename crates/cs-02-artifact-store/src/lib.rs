//! # CS-02 Artifact Store
//!
//! Durable mapping from `(network, logical name)` to the deployed artifact.
//! It is the single source of truth the orchestrator consults to decide
//! between reusing an artifact and creating it.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Write Rules
//!
//! - At most one artifact per `(network, name)` key.
//! - An occupied key is only overwritten through an explicit `force` flag;
//!   otherwise `put` fails with [`StoreError::ArtifactAlreadyExists`].
//! - Asset bindings are never persisted. They are re-resolved on every run.
//!
//! ## Module Structure
//!
//! ```text
//! cs-02-artifact-store/
//! ├── domain/          # Artifact, ArtifactKind, CreationRecord, DeployedSet, StoreError
//! ├── ports/           # ArtifactStore
//! └── adapters/
//!     ├── memory.rs    # InMemoryArtifactStore
//!     ├── file.rs      # FileArtifactStore (<root>/<network>/artifacts.json)
//!     └── lock.rs      # NetworkLock (<root>/<network>/LOCK)
//! ```

#![warn(missing_docs)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{FileArtifactStore, InMemoryArtifactStore, NetworkLock};
pub use domain::{Artifact, ArtifactKind, CreationRecord, DeployedSet, StoreError};
pub use ports::ArtifactStore;
