//! Shared request layer for the task backend.
//!
//! Every outgoing call goes through [`ApiClient`], which provides:
//! - the default `Authorization: Bearer` header while a session exists
//! - JSON request/response handling against a configured base URL
//! - per-operation timeouts (read vs write)
//! - an `X-Request-ID` on every request for log correlation
//! - structured logging and optional Prometheus metrics
//!
//! Requests are never retried: each failure is reported once and the
//! caller decides whether to try again.

use crate::config::ClientConfig;
use crate::models::ValidationError;
use crate::services::metrics::ApiClientMetrics;
use crate::storage::StorageError;
use crate::utils::{error_message_from_body, redact_sensitive_data, route_pattern};
use reqwest::{
    Client, Method, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// A request path below the API base URL.
///
/// A `str` path is split on `/`. A slice of segments is taken as-is, so a
/// segment containing `/` stays one percent-encoded segment.
pub trait ApiPath {
    fn segments(&self) -> Vec<&str>;

    /// Path form used for route labels in logs and metrics
    fn label(&self) -> String {
        let encoded: Vec<String> = self
            .segments()
            .iter()
            .map(|s| s.replace('%', "%25").replace('/', "%2F"))
            .collect();
        format!("/{}", encoded.join("/"))
    }
}

impl ApiPath for str {
    fn segments(&self) -> Vec<&str> {
        self.split('/').filter(|s| !s.is_empty()).collect()
    }
}

impl ApiPath for String {
    fn segments(&self) -> Vec<&str> {
        self.as_str().segments()
    }
}

impl ApiPath for [&str] {
    fn segments(&self) -> Vec<&str> {
        self.to_vec()
    }
}

impl<const N: usize> ApiPath for [&str; N] {
    fn segments(&self) -> Vec<&str> {
        self.to_vec()
    }
}

/// Operation type for determining the appropriate timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationType {
    Read,
    Write,
}

impl OperationType {
    fn for_method(method: &Method) -> Self {
        if *method == Method::GET {
            OperationType::Read
        } else {
            OperationType::Write
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            OperationType::Read => "read",
            OperationType::Write => "write",
        }
    }
}

/// HTTP client bound to one backend, shared by the session manager and the
/// task controller.
///
/// Cloning is cheap and every clone sees the same authorization token, so a
/// login through one handle is visible to requests made through another.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    auth_token: Arc<RwLock<Option<String>>>,
    read_timeout: Duration,
    write_timeout: Duration,
    detailed_logging: bool,
    metrics: Option<ApiClientMetrics>,
}

impl ApiClient {
    /// Create a client for the backend at `config.api_url`
    pub fn new(config: &ClientConfig, metrics: Option<ApiClientMetrics>) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: expected an http(s) URL",
                config.api_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let read_timeout = Duration::from_secs(config.read_timeout_seconds);
        let write_timeout = Duration::from_secs(config.write_timeout_seconds);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::cmp::max(read_timeout, write_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            auth_token: Arc::new(RwLock::new(None)),
            read_timeout,
            write_timeout,
            detailed_logging: config.enable_detailed_logging,
            metrics,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn metrics(&self) -> Option<&ApiClientMetrics> {
        self.metrics.as_ref()
    }

    /// Set or clear the default bearer token sent with every request
    pub fn set_auth_token(&self, token: Option<&str>) {
        let mut guard = self
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = token.map(str::to_string);
        debug!(authenticated = guard.is_some(), "Updated default authorization");
    }

    pub fn auth_token(&self) -> Option<String> {
        self.auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_auth(&self) -> bool {
        self.auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Resolve an API path against the base URL.
    ///
    /// Each path segment is percent-encoded; a base URL with its own path
    /// prefix keeps it.
    pub fn url_for(&self, path: &(impl ApiPath + ?Sized)) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(path.segments());
        }
        Ok(url)
    }

    /// `GET` a JSON resource
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &(impl ApiPath + ?Sized),
    ) -> Result<R, ApiError> {
        let body = self.execute(Method::GET, path, None).await?;
        decode(&body)
    }

    /// `POST` a JSON body and decode the JSON response
    pub async fn post<B, R>(&self, path: &(impl ApiPath + ?Sized), json: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let value = encode(json)?;
        let body = self.execute(Method::POST, path, Some(value)).await?;
        decode(&body)
    }

    /// `PATCH` a JSON body and decode the JSON response
    pub async fn patch<B, R>(&self, path: &(impl ApiPath + ?Sized), json: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = self.patch_raw(path, json).await?;
        decode(&body)
    }

    /// `PATCH` a JSON body and return the raw response body.
    ///
    /// Any 2xx counts as success, including an empty `204`.
    pub async fn patch_raw<B>(
        &self,
        path: &(impl ApiPath + ?Sized),
        json: &B,
    ) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let value = encode(json)?;
        self.execute(Method::PATCH, path, Some(value)).await
    }

    /// `DELETE` a resource; any response body is ignored
    pub async fn delete(&self, path: &(impl ApiPath + ?Sized)) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, None).await.map(|_| ())
    }

    async fn execute(
        &self,
        method: Method,
        path: &(impl ApiPath + ?Sized),
        json: Option<serde_json::Value>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url_for(path)?;
        let route = route_pattern(&path.label());
        let operation = OperationType::for_method(&method);
        let timeout = match operation {
            OperationType::Read => self.read_timeout,
            OperationType::Write => self.write_timeout,
        };
        let request_id = Uuid::new_v4().to_string();

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(REQUEST_ID_HEADER, request_id.as_str());

        if let Some(token) = self.auth_token() {
            request = request.bearer_auth(token);
        }
        if let Some(ref value) = json {
            request = request.json(value);
        }

        if self.detailed_logging {
            debug!(
                request_id = %request_id,
                method = %method,
                url = %url,
                body = ?json.as_ref().map(|v| redact_sensitive_data(&v.to_string())),
                "Sending request"
            );
        }

        let start = Instant::now();
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<(StatusCode, Vec<u8>), reqwest::Error>((status, body.to_vec()))
        };
        let result = tokio::time::timeout(timeout, exchange).await;
        let duration = start.elapsed();

        match result {
            Ok(Ok((status, body))) if status.is_success() => {
                if self.detailed_logging {
                    info!(
                        request_id = %request_id,
                        method = %method,
                        route = %route,
                        status = status.as_u16(),
                        duration_ms = duration.as_millis() as u64,
                        "Request completed successfully"
                    );
                }
                self.record_request(&route, &method, "success", duration);
                Ok(body)
            }
            Ok(Ok((status, body))) => {
                let message = error_message_from_body(&body);
                warn!(
                    request_id = %request_id,
                    method = %method,
                    route = %route,
                    status = status.as_u16(),
                    message = ?message.as_deref().map(redact_sensitive_data),
                    duration_ms = duration.as_millis() as u64,
                    "Request failed with error status"
                );
                self.record_request(&route, &method, "http_error", duration);
                Err(ApiError::from_status(status.as_u16(), message))
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!(
                    request_id = %request_id,
                    method = %method,
                    route = %route,
                    "Request timed out in transport"
                );
                self.record_request(&route, &method, "timeout", duration);
                self.record_timeout(&route, operation);
                Err(ApiError::Timeout)
            }
            Ok(Err(e)) => {
                error!(
                    request_id = %request_id,
                    method = %method,
                    route = %route,
                    error = %e,
                    duration_ms = duration.as_millis() as u64,
                    "No response received, network issue or unreachable backend"
                );
                self.record_request(&route, &method, "network_error", duration);
                Err(ApiError::Network(e))
            }
            Err(_) => {
                warn!(
                    request_id = %request_id,
                    method = %method,
                    route = %route,
                    timeout_seconds = timeout.as_secs(),
                    "Request timed out"
                );
                self.record_request(&route, &method, "timeout", duration);
                self.record_timeout(&route, operation);
                Err(ApiError::Timeout)
            }
        }
    }

    fn record_request(&self, route: &str, method: &Method, outcome: &str, duration: Duration) {
        if let Some(metrics) = &self.metrics {
            metrics.record_request(route, method.as_str(), outcome, duration);
        }
    }

    fn record_timeout(&self, route: &str, operation: OperationType) {
        if let Some(metrics) = &self.metrics {
            metrics.record_timeout(route, operation.as_str());
        }
    }
}

fn encode<B: Serialize + ?Sized>(json: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(json).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Errors surfaced by the API client and the components built on it
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed with status {status}")]
    Authentication { status: u16, message: Option<String> },

    #[error("Server returned status {status}")]
    Server { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("No task with id {0}")]
    NotFound(String),

    #[error("View was closed before the response arrived")]
    ViewUnmounted,

    #[error("Invalid response payload: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Classify a non-2xx response
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 | 403 => ApiError::Authentication { status, message },
            _ => ApiError::Server { status, message },
        }
    }

    /// The message the backend put in its error payload, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Authentication { message, .. } | ApiError::Server { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// HTTP status of a backend rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. } | ApiError::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// True when no response was received at all
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }

    /// Get a user-friendly error message for display
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.message().to_string(),
            ApiError::Authentication { message, .. } => message
                .clone()
                .unwrap_or_else(|| "Invalid credentials".to_string()),
            ApiError::Server { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("Server returned error status {}, please try again", status)),
            ApiError::Network(_) => {
                "Unable to reach the server, check your connection and try again".to_string()
            }
            ApiError::Timeout => "The server took too long to respond, please try again".to_string(),
            ApiError::NotAuthenticated => "Please log in first".to_string(),
            ApiError::NotFound(id) => format!("Task {} was not found", id),
            ApiError::ViewUnmounted => "The request was abandoned".to_string(),
            ApiError::Decode(_) => "Unexpected response from the server".to_string(),
            ApiError::Serialization(_) => "Invalid request data".to_string(),
            ApiError::Storage(_) => "Could not access local session storage".to_string(),
            ApiError::InvalidUrl(url) => format!("The configured API URL is invalid: {}", url),
        }
    }
}
