//! Taskdeck - a client for a personal task-list backend
//!
//! The library holds everything between the user and the HTTP backend:
//! - Account registration and login, with the session persisted locally
//! - A bearer-authenticated request layer with timeouts, request ids and metrics
//! - A local mirror of the user's tasks with create, toggle and delete
//! - Plain-text rendering of the list for the `taskdeck` command
//!
//! ## Architecture
//!
//! - `models/` - Wire types, form validation and audit events
//! - `services/` - API client, session manager and task list controller
//! - `storage/` - Durable key/value storage for the session
//! - `config/` - Configuration structures and environment loading
//! - `utils/` - Redaction, route labels and date handling
//! - `views` - Text rendering of the list view
//! - `cli` - Command-line front end
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdeck::{ApiClient, ClientConfig, FileStore, SessionManager, TaskListController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), taskdeck::ApiError> {
//!     let config = ClientConfig::from_env();
//!     let api = ApiClient::new(&config, None)?;
//!     let store = Arc::new(FileStore::new(config.state_dir.clone()));
//!
//!     let mut session = SessionManager::new(api, store);
//!     session.login("alice@example.com", "secret1").await?;
//!
//!     let mut tasks = TaskListController::new(session.api().clone());
//!     tasks.load_tasks().await?;
//!     Ok(())
//! }
//! ```

// Core modules
pub mod cli;
pub mod config;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
pub mod views;

// Re-export commonly used types and functions for convenience
pub use config::{ClientConfig, LogFormat, LoggingConfig, MetricsConfig, init_tracing};
pub use models::{
    LoginForm, RegisterForm, Session, SessionAuditEvent, SessionEventOutcome, SessionEventType,
    Task, TaskForm, ValidationError, VersionInfo,
};
pub use services::{
    ApiClient, ApiClientMetrics, ApiError, FormState, Notice, SessionManager, TaskListController,
    ViewGuard, ViewState,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use utils::{redact_sensitive_data, route_pattern};
