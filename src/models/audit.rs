//! Session audit logging data structures and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Types of session events for audit logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventType {
    RegisterSuccess,
    RegisterFailure,
    LoginSuccess,
    LoginFailure,
    Logout,
    SessionRestored,
    SessionDiscarded,
}

/// Outcomes of session events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventOutcome {
    Success,
    Failure,
}

/// Structured audit log entry for session changes.
///
/// Never carries the password or the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAuditEvent {
    pub event_type: SessionEventType,
    pub outcome: SessionEventOutcome,
    pub timestamp: DateTime<Utc>,
    pub username: Option<String>,
    pub endpoint: Option<String>,
    pub status: Option<u16>,
    pub reason: Option<String>,
}

impl SessionAuditEvent {
    /// Create a new audit event with basic information
    pub fn new(event_type: SessionEventType, outcome: SessionEventOutcome) -> Self {
        Self {
            event_type,
            outcome,
            timestamp: Utc::now(),
            username: None,
            endpoint: None,
            status: None,
            reason: None,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }

    /// Log the audit event using structured logging
    pub fn log(&self) {
        info!(
            target: "session_audit",
            event_type = ?self.event_type,
            outcome = ?self.outcome,
            timestamp = %self.timestamp,
            username = ?self.username,
            endpoint = ?self.endpoint,
            status = ?self.status,
            reason = ?self.reason,
            "Session audit event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_serialization() {
        let event = SessionAuditEvent::new(SessionEventType::LoginFailure, SessionEventOutcome::Failure)
            .with_endpoint("/api/auth/login")
            .with_status(Some(401))
            .with_reason(Some("Invalid credentials".to_string()));

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], "login_failure");
        assert_eq!(value["outcome"], "failure");
        assert_eq!(value["status"], 401);
        assert!(value["username"].is_null());

        event.log();
    }
}
