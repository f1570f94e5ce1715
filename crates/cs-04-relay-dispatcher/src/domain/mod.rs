//! # Domain Module
//!
//! - `message`: messages, submissions, receipts and outcomes
//! - `state`: per-attempt state machine and run receipts
//! - `ordering`: per-destination delivery ledger
//! - `config`: relay tuning
//! - `errors`: `RelayError`

pub mod config;
pub mod errors;
pub mod message;
pub mod ordering;
pub mod state;

pub use config::*;
pub use errors::*;
pub use message::*;
pub use ordering::*;
pub use state::*;
