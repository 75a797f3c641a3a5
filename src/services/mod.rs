//! Client-side services.
//!
//! This module contains the core logic of the application: the shared
//! request layer, session management, the task list controller, and
//! request metrics.

pub mod api_client;
pub mod metrics;
pub mod session;
pub mod tasks;

pub use api_client::*;
pub use metrics::*;
pub use session::*;
pub use tasks::*;
