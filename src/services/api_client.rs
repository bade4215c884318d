//! HTTP transport for the swap-matching API.
//!
//! This module provides the single client every gateway call goes through:
//! - Base URL joining and per-operation timeouts
//! - Bearer token attachment from the shared [`Session`]
//! - Request correlation through `X-Request-ID`
//! - Mapping of HTTP failures onto [`ApiError`]
//! - Structured logging and optional Prometheus metrics
//!
//! Each call is attempted exactly once. Failures are reported to the caller and
//! never retried here.

use std::time::Instant;

use reqwest::{Client, Method, Response, StatusCode, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::models::ErrorBody;
use crate::services::metrics::ClientMetrics;
use crate::services::session::Session;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Generic text shown when the server could not be reached
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Could not connect to the server. Please try again later.";

/// Errors that can occur when calling the API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No session token, login required")]
    Unauthenticated,

    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("session expired"))]
    Unauthorized { message: Option<String> },

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected status code: {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Get a short user-facing message for this failure
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthenticated => "Please log in to continue.".to_string(),
            ApiError::Unauthorized { message } => message
                .clone()
                .unwrap_or_else(|| "Your session has expired. Please log in again.".to_string()),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Status(status) => {
                format!("The server returned an error ({status}). Please try again.")
            }
            ApiError::Network(_) | ApiError::Timeout => CONNECTION_ERROR_MESSAGE.to_string(),
            ApiError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ApiError::Serialization(_) => "Invalid request data".to_string(),
            ApiError::InvalidUrl(_) => "The API address is not valid.".to_string(),
        }
    }

    /// True when the failure means the user has to log in again
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::Unauthorized { .. })
    }

    /// HTTP status of a server-side failure
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Rejected { status, .. } | ApiError::Status(status) => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    fn outcome_label(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated | ApiError::Unauthorized { .. } => "unauthorized",
            ApiError::Rejected { .. } | ApiError::Status(_) => "rejected",
            ApiError::Network(_) => "network_error",
            ApiError::Timeout => "timeout",
            ApiError::Decode(_) => "decode_error",
            ApiError::Serialization(_) | ApiError::InvalidUrl(_) => "error",
        }
    }
}

/// One API call: which route template it hits and how
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: Method,
    /// Route template used for metrics and logs, e.g. `/usuarios/{id}`
    pub route: &'static str,
    pub path: String,
    pub authenticated: bool,
}

impl Call {
    pub fn get(route: &'static str, path: impl Into<String>) -> Self {
        Self::new(Method::GET, route, path)
    }

    pub fn post(route: &'static str, path: impl Into<String>) -> Self {
        Self::new(Method::POST, route, path)
    }

    pub fn put(route: &'static str, path: impl Into<String>) -> Self {
        Self::new(Method::PUT, route, path)
    }

    fn new(method: Method, route: &'static str, path: impl Into<String>) -> Self {
        Self {
            method,
            route,
            path: path.into(),
            authenticated: true,
        }
    }

    /// Send without a bearer token (login and registration)
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Request body of a call
pub(crate) enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

impl Body {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// Client for the swap-matching API
pub struct ApiClient {
    client: Client,
    base_url: Url,
    config: ClientConfig,
    session: Session,
    metrics: Option<ClientMetrics>,
}

impl ApiClient {
    /// Create a new API client bound to `session`
    pub fn new(
        config: ClientConfig,
        session: Session,
        metrics: Option<ClientMetrics>,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&config.base_url)?;

        let client = Client::builder()
            .timeout(std::cmp::max(config.read_timeout(), config.write_timeout()))
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
            session,
            metrics,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve an endpoint path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Execute a call and decode its JSON body
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        call: Call,
        body: Body,
    ) -> Result<T, ApiError> {
        let response = self.execute(call, body).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Execute a call whose response body is not needed
    pub(crate) async fn send(&self, call: Call, body: Body) -> Result<(), ApiError> {
        self.execute(call, body).await.map(|_| ())
    }

    /// Execute one call against the API
    pub(crate) async fn execute(&self, call: Call, body: Body) -> Result<Response, ApiError> {
        let url = self.endpoint(&call.path)?;

        // Fail before touching the network when there is nothing to authenticate with
        let token = if call.authenticated {
            Some(self.session.token().ok_or(ApiError::Unauthenticated)?)
        } else {
            None
        };

        let timeout = if call.method == Method::GET {
            self.config.read_timeout()
        } else {
            self.config.write_timeout()
        };

        let request_id = Uuid::new_v4().to_string();
        let mut builder = self
            .client
            .request(call.method.clone(), url)
            .timeout(timeout)
            .header(REQUEST_ID_HEADER, &request_id);

        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }

        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form),
        };

        let start = Instant::now();
        let result = builder.send().await;
        let duration = start.elapsed();

        let outcome = match result {
            Ok(response) if response.status().is_success() => {
                if self.config.enable_detailed_logging {
                    info!(
                        route = call.route,
                        method = %call.method,
                        path = %call.path,
                        status = response.status().as_u16(),
                        duration_ms = duration.as_millis() as u64,
                        request_id = %request_id,
                        "API request completed"
                    );
                }
                Ok(response)
            }
            Ok(response) => {
                let err = error_from_response(response).await;
                if self.config.enable_detailed_logging {
                    warn!(
                        route = call.route,
                        method = %call.method,
                        path = %call.path,
                        status = err.status().unwrap_or_default(),
                        duration_ms = duration.as_millis() as u64,
                        request_id = %request_id,
                        "API request rejected"
                    );
                }
                if call.authenticated && err.requires_login() {
                    self.session.logout();
                }
                Err(err)
            }
            Err(e) => {
                let err = if e.is_timeout() {
                    ApiError::Timeout
                } else {
                    ApiError::Network(e)
                };
                error!(
                    route = call.route,
                    method = %call.method,
                    path = %call.path,
                    error = %err,
                    duration_ms = duration.as_millis() as u64,
                    request_id = %request_id,
                    "API request failed"
                );
                Err(err)
            }
        };

        if let Some(metrics) = &self.metrics {
            let label = match &outcome {
                Ok(_) => "success",
                Err(err) => err.outcome_label(),
            };
            metrics.record(call.route, call.method.as_str(), label, duration);
        }

        outcome
    }
}

/// Base URLs are treated as directories so relative endpoint paths append to them
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Turn a non-success response into an error, surfacing the server's message
async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let message = response
        .bytes()
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<ErrorBody>(&bytes).ok())
        .and_then(ErrorBody::into_message);

    match (status, message) {
        (StatusCode::UNAUTHORIZED, message) => ApiError::Unauthorized { message },
        (status, Some(message)) => ApiError::Rejected {
            status: status.as_u16(),
            message,
        },
        (status, None) => ApiError::Status(status.as_u16()),
    }
}
