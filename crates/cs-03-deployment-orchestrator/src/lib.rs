//! # CS-03 Deployment Orchestrator
//!
//! Turns a declarative [`DeploySpec`] into an ordered sequence of on-chain
//! steps and executes them against one network.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Guarantees
//!
//! | Property | How |
//! |----------|-----|
//! | Dependency order | Kahn's algorithm over `$ref` / `target` / `depends_on` edges |
//! | Deterministic plans | Ready steps are taken in declaration order |
//! | No partial validation | Names, references, config keys, assets and cycles are checked before any transaction |
//! | Idempotence | Every step consults the Artifact Store first and reuses what is there |
//! | Resumability | Each artifact is persisted before its dependents start |
//! | Explicit redeploys | Only steps named in [`DeployOptions`] are recreated |
//!
//! ## Module Structure
//!
//! ```text
//! cs-03-deployment-orchestrator/
//! ├── domain/          # DeploySpec, ParamValue, DeploymentPlan, Deployed, DeployError
//! ├── algorithms/      # Kahn's ordering, parameter resolution
//! ├── context.rs       # DeploymentManagerContext, NetworkSettings
//! ├── ports/           # DeploymentApi (inbound), ConfigSource (outbound)
//! ├── adapters/        # FileConfigSource (Spider layout)
//! └── service.rs       # DeploymentOrchestrator
//! ```

#![warn(missing_docs)]

pub mod adapters;
pub mod algorithms;
pub mod context;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::FileConfigSource;
pub use context::{DeploymentManagerContext, NetworkSettings};
pub use domain::{
    CallSpec, ContractSpec, DeployError, DeploySpec, Deployed, DeploymentPlan, FailureCause,
    ParamValue, PlanStep, StepAction, StepKind,
};
pub use ports::{ConfigSource, DeploymentApi};
pub use service::{DeployOptions, DeploymentOrchestrator, ForceRedeploy};
