//! # Adapters
//!
//! - `memory`: `InMemoryArtifactStore` for tests and dry runs
//! - `file`: `FileArtifactStore`, one JSON document per network
//! - `lock`: `NetworkLock`, process-level exclusion per network using fs2

mod file;
mod lock;
mod memory;

pub use file::FileArtifactStore;
pub use lock::NetworkLock;
pub use memory::InMemoryArtifactStore;
