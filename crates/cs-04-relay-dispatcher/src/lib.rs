//! # CS-04 Relay Dispatcher
//!
//! Propagates governance actions approved on the primary network to each
//! satellite network through that network's bridge.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Selection vs Mechanism
//!
//! The [`RelayDispatcher`] only selects: it maps the satellite network to a
//! registered [`RelayStrategy`]. Each strategy owns how its bridge delivers
//! and confirms a message. Adding a bridge family means registering a
//! strategy, never editing the dispatcher.
//!
//! ## Relay Attempt State Machine
//!
//! ```text
//! Packaged ──→ Submitted ──→ Confirmed
//!    │             │
//!    └─────────────┴──────→ Failed
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! cs-04-relay-dispatcher/
//! ├── domain/          # GovernanceMessage, RelayState, RelayReceipt, DeliveryLedger, RelayError
//! ├── ports/           # RelayApi (inbound), RelayStrategy + FinalityChecker (outbound)
//! ├── adapters/        # ConfigurableFinalityChecker, PolygonFxStrategy
//! └── dispatcher.rs    # RelayDispatcher
//! ```

#![warn(missing_docs)]

pub mod adapters;
pub mod dispatcher;
pub mod domain;
pub mod ports;

pub use adapters::{ConfigurableFinalityChecker, PolygonFxStrategy};
pub use dispatcher::RelayDispatcher;
pub use domain::{
    BridgeSubmission, DeliveryLedger, FailureReason, GovernanceMessage, LedgerError,
    PendingReceipt, RelayAttempt, RelayConfig, RelayError, RelayOutcome, RelayReceipt, RelayState,
};
pub use ports::{FinalityChecker, RelayApi, RelayStrategy};
