//! Configuration for the backend API client and local session storage.

use std::{env, path::PathBuf};

/// Base URL used when `TASKDECK_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Configuration for talking to the task backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without the `/api` prefix
    pub api_url: String,

    /// Directory holding persisted client state (the stored session)
    pub state_dir: PathBuf,

    /// Timeout for read operations (in seconds)
    pub read_timeout_seconds: u64,

    /// Timeout for write operations (in seconds)
    pub write_timeout_seconds: u64,

    /// Connection timeout (in seconds)
    pub connect_timeout_seconds: u64,

    /// Log every request and response at info level
    pub enable_detailed_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: default_state_dir(),
            read_timeout_seconds: 10,
            write_timeout_seconds: 10,
            connect_timeout_seconds: 5,
            enable_detailed_logging: true,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = env::var("TASKDECK_API_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        let state_dir = env::var("TASKDECK_STATE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);

        let read_timeout_seconds = timeout_from_env("TASKDECK_READ_TIMEOUT")
            .unwrap_or(defaults.read_timeout_seconds);

        let write_timeout_seconds = timeout_from_env("TASKDECK_WRITE_TIMEOUT")
            .unwrap_or(defaults.write_timeout_seconds);

        let connect_timeout_seconds = timeout_from_env("TASKDECK_CONNECT_TIMEOUT")
            .unwrap_or(defaults.connect_timeout_seconds);

        let enable_detailed_logging = env::var("TASKDECK_DETAILED_LOGGING")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.enable_detailed_logging);

        Self {
            api_url,
            state_dir,
            read_timeout_seconds,
            write_timeout_seconds,
            connect_timeout_seconds,
            enable_detailed_logging,
        }
    }

    /// Builder-style override of the backend URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Builder-style override of the state directory
    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = state_dir.into();
        self
    }
}

/// A timeout in whole seconds; zero would fail every request at once
fn timeout_from_env(var: &str) -> Option<u64> {
    env::var(var)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|&secs: &u64| secs > 0)
}

fn default_state_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("taskdeck"))
        .unwrap_or_else(|| PathBuf::from(".taskdeck"))
}
