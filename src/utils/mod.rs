//! Utility functions and helper modules.
//!
//! Route normalisation for metric labels, log redaction, HTTP payload helpers
//! and date parsing/formatting.

pub mod http;
pub mod redact;
pub mod route;
pub mod time;

pub use http::*;
pub use redact::*;
pub use route::*;
