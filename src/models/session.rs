//! Authentication-related data models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated identity plus the bearer credential held by the client.
///
/// This is also the exact shape persisted under the session storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub token: String,
}

impl Session {
    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Request body for `POST /api/auth/register`
#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Request body for `POST /api/auth/login`
#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Error payload returned by the backend on non-2xx responses
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Human-readable message, preferring `message` over `error`
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_without_email() {
        let session: Session =
            serde_json::from_str(r#"{"username":"alice","token":"abc"}"#).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.email, "");
        assert_eq!(session.bearer(), "Bearer abc");
    }

    #[test]
    fn test_error_body_message_preference() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"User already exists","error":"Conflict"}"#)
                .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("User already exists"));

        let body: ErrorBody = serde_json::from_str(r#"{"error":"Bad Request"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Bad Request"));

        let body: ErrorBody = serde_json::from_str(r#"{"message":"   "}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }

    #[test]
    fn test_request_debug_hides_password() {
        let register = RegisterRequest {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "secret1".to_string(),
        };
        let output = format!("{register:?}");
        assert!(output.contains("alice"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("secret1"));

        let login = LoginRequest {
            email: "a@x.com".to_string(),
            password: "secret1".to_string(),
        };
        let output = format!("{login:?}");
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("secret1"));
    }
}
