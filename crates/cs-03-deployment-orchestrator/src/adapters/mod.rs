//! # Adapters
//!
//! - `spider`: `FileConfigSource`, reads the Spider directory layout

mod spider;

pub use spider::FileConfigSource;
