//! # Ports Module
//!
//! - `inbound`: what the orchestrator offers (`DeploymentApi`)
//! - `outbound`: where deploy specs come from (`ConfigSource`)

pub mod inbound;
pub mod outbound;

pub use inbound::DeploymentApi;
pub use outbound::ConfigSource;
