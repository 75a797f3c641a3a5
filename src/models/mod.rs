//! Data models shared by the session manager, the task controller and the views.
//!
//! This module contains the wire types exchanged with the backend, the local
//! form types validated before any request, and audit types.

pub mod api;
pub mod audit;
pub mod forms;
pub mod session;
pub mod task;

pub use api::*;
pub use audit::*;
pub use forms::*;
pub use session::*;
pub use task::*;
