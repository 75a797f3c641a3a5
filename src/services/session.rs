//! Session management: who is logged in, and with which bearer token.
//!
//! [`SessionManager`] is the single owner of the current [`Session`]. It is
//! built once at start-up from durable storage and handed to whatever needs
//! it. Every change to the session goes through [`SessionManager::set_session`],
//! which keeps three things in step:
//! - the in-memory value returned by [`SessionManager::current_session`]
//! - the persisted entry under [`SESSION_KEY`]
//! - the default `Authorization` header of the shared [`ApiClient`]

use crate::models::{
    LoginForm, LoginRequest, RegisterForm, RegisterRequest, Session, SessionAuditEvent,
    SessionEventOutcome, SessionEventType,
};
use crate::services::api_client::{ApiClient, ApiError};
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Storage key holding the serialized session
pub const SESSION_KEY: &str = "user";

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";

#[derive(Debug, Clone, Copy)]
enum AuthFlow {
    Register,
    Login,
}

impl AuthFlow {
    fn path(self) -> &'static str {
        match self {
            AuthFlow::Register => REGISTER_PATH,
            AuthFlow::Login => LOGIN_PATH,
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            AuthFlow::Register => "Registration failed",
            AuthFlow::Login => "Login failed",
        }
    }

    fn events(self) -> (SessionEventType, SessionEventType) {
        match self {
            AuthFlow::Register => (
                SessionEventType::RegisterSuccess,
                SessionEventType::RegisterFailure,
            ),
            AuthFlow::Login => (SessionEventType::LoginSuccess, SessionEventType::LoginFailure),
        }
    }
}

/// Owner of the authenticated identity
pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    session: Option<Session>,
    last_error: Option<String>,
}

impl SessionManager {
    /// Build the manager, restoring any session persisted by a previous run.
    ///
    /// Unreadable or corrupt entries are treated as "logged out"; a corrupt
    /// entry is removed so it does not trip every later start-up.
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        let mut manager = Self {
            api,
            store,
            session: None,
            last_error: None,
        };

        let restored = manager.restore();
        manager.apply(restored);
        manager
    }

    fn restore(&self) -> Option<Session> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Could not read stored session, starting logged out");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if !session.token.is_empty() => {
                SessionAuditEvent::new(SessionEventType::SessionRestored, SessionEventOutcome::Success)
                    .with_username(Some(session.username.clone()))
                    .log();
                Some(session)
            }
            Ok(_) | Err(_) => {
                warn!("Stored session is corrupt, discarding it");
                if let Err(e) = self.store.remove(SESSION_KEY) {
                    warn!(error = %e, "Could not remove corrupt session entry");
                }
                SessionAuditEvent::new(SessionEventType::SessionDiscarded, SessionEventOutcome::Failure)
                    .with_reason(Some("corrupt stored session".to_string()))
                    .log();
                None
            }
        }
    }

    /// The shared request layer this manager configures
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Synchronous read of the in-memory session
    pub fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Message of the last failed register/login, for inline display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Register a new account and start a session for it
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.authenticate(AuthFlow::Register, &body, Some(username)).await
    }

    /// Validate the registration form, then register.
    ///
    /// Validation failures never reach the network.
    pub async fn register_with_form(&mut self, form: &RegisterForm) -> Result<Session, ApiError> {
        let body = form.validate().inspect_err(|e| {
            self.last_error = Some(e.message().to_string());
        })?;
        self.authenticate(AuthFlow::Register, &body, Some(form.username.as_str())).await
    }

    /// Log in with existing credentials
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.authenticate(AuthFlow::Login, &body, None).await
    }

    /// Validate the login form, then log in
    pub async fn login_with_form(&mut self, form: &LoginForm) -> Result<Session, ApiError> {
        let body = form.validate().inspect_err(|e| {
            self.last_error = Some(e.message().to_string());
        })?;
        self.authenticate(AuthFlow::Login, &body, None).await
    }

    /// Drop the session locally. No backend call is made.
    pub fn logout(&mut self) {
        let username = self.session.as_ref().map(|s| s.username.clone());

        if let Err(e) = self.store.remove(SESSION_KEY) {
            // The in-memory session is cleared regardless
            error!(error = %e, "Could not remove stored session");
        }
        self.apply(None);

        SessionAuditEvent::new(SessionEventType::Logout, SessionEventOutcome::Success)
            .with_username(username)
            .log();
    }

    async fn authenticate<B: serde::Serialize>(
        &mut self,
        flow: AuthFlow,
        body: &B,
        username_hint: Option<&str>,
    ) -> Result<Session, ApiError> {
        self.clear_error();
        let (success_event, failure_event) = flow.events();

        let response = self.api.post::<_, Session>(flow.path(), body).await;
        let result = match response {
            Ok(session) if session.token.is_empty() => Err(ApiError::Decode(
                "response did not include a session token".to_string(),
            )),
            Ok(session) => self.set_session(Some(session.clone())).map(|_| session),
            Err(e) => Err(e),
        };

        match result {
            Ok(session) => {
                info!(username = %session.username, flow = ?flow, "Session started");
                SessionAuditEvent::new(success_event, SessionEventOutcome::Success)
                    .with_username(Some(session.username.clone()))
                    .with_endpoint(flow.path())
                    .log();
                Ok(session)
            }
            Err(e) => {
                let message = failure_message(&e, flow);
                warn!(flow = ?flow, error = %e, message = %message, "Authentication failed");
                SessionAuditEvent::new(failure_event, SessionEventOutcome::Failure)
                    .with_username(username_hint.map(str::to_string))
                    .with_endpoint(flow.path())
                    .with_status(e.status())
                    .with_reason(Some(message.clone()))
                    .log();
                self.last_error = Some(message);
                Err(e)
            }
        }
    }

    /// Persist and publish a new session value.
    ///
    /// Storage is written first; if that fails nothing else changes.
    fn set_session(&mut self, session: Option<Session>) -> Result<(), ApiError> {
        match &session {
            Some(s) => {
                let raw = serde_json::to_string(s)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                self.store.set(SESSION_KEY, &raw)?;
            }
            None => self.store.remove(SESSION_KEY)?,
        }
        self.apply(session);
        Ok(())
    }

    fn apply(&mut self, session: Option<Session>) {
        self.api
            .set_auth_token(session.as_ref().map(|s| s.token.as_str()));
        self.session = session;
    }
}

/// Message shown to the user for a failed register/login
fn failure_message(error: &ApiError, flow: AuthFlow) -> String {
    if let Some(message) = error.server_message() {
        return message.to_string();
    }
    if error.is_network() {
        return error.user_message();
    }
    flow.fallback_message().to_string()
}
