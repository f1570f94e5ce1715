//! # Comet Satellite Test Suite
//!
//! Cross-subsystem flows driven through the runtime against simulated chains.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── deployment_flows.rs   # shipped Polygon USDC config, resume, redeploy
//!     └── relay_flows.rs        # governance relay after deployment
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cs-tests
//! cargo test -p cs-tests integration::relay_flows
//! ```

pub mod integration;
