//! Configuration structures and loading utilities.
//!
//! Every configuration struct has a `Default` and a `from_env()` constructor
//! that falls back to the default for any unset or unparseable variable.

pub mod client;
pub mod logging;
pub mod metrics;

pub use client::*;
pub use logging::*;
pub use metrics::*;
