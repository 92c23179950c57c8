//! HTTP client for the Do-it backend.
//!
//! A single cookie-jar client carries the ambient session credentials on
//! every request; methods map 1:1 to the backend routes.

use std::fmt;

use anyhow::{Context, Result};
use serde_json::Value;

mod types;

pub use types::{Category, Task, TaskDraft, TwoFactorSetup, TwoFactorVerify};

use types::{CreateTaskRequest, SessionStatusResponse};

/// Default base URL for a local Do-it backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Standard User-Agent header for doit API requests.
pub const USER_AGENT: &str = concat!("doit/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Config resolution
// ============================================================================

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Resolves the base URL with precedence: env > config > default.
    ///
    /// # Arguments
    /// * `config_base_url` - Value from the config file (if present)
    ///
    /// Environment variables:
    /// - `DOIT_BACKEND_URL` (optional override)
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not well-formed.
    pub fn from_env(config_base_url: Option<&str>) -> Result<Self> {
        // Try env var first
        if let Ok(env_url) = std::env::var("DOIT_BACKEND_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(Self {
                    base_url: trimmed.trim_end_matches('/').to_string(),
                });
            }
        }

        // Try config value
        if let Some(config_url) = config_base_url {
            let trimmed = config_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(Self {
                    base_url: trimmed.trim_end_matches('/').to_string(),
                });
            }
        }

        // Default
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid backend base URL: {url}"))?;
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

/// Categories of backend errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection-level failure (DNS, refused, reset)
    Transport,
    /// Connection or request timeout
    Timeout,
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Failed to parse a response body
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the backend with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new backend error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error.
    ///
    /// The backend reports failures as `{ "message": "..." }`; when the body
    /// carries one it is surfaced in the summary.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body)
                && let Some(msg) = json.get("message").and_then(|v| v.as_str())
            {
                return Self {
                    kind: ApiErrorKind::HttpStatus,
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            details,
        }
    }

    fn transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ApiErrorKind::Timeout
        } else {
            ApiErrorKind::Transport
        };
        Self::new(kind, err.to_string())
    }

    fn parse(err: &reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Parse, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for backend operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// ============================================================================
// Client
// ============================================================================

/// Do-it backend client.
///
/// Cheap to clone; clones share the underlying connection pool and cookie
/// jar, so session credentials set by the backend are replayed on every
/// subsequent request from any clone.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a new client with a cookie jar for ambient credentials.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            base_url: config.base_url,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `/api/users/status`: whether the visitor has an active session.
    pub async fn session_status(&self) -> ApiResult<bool> {
        let url = format!("{}/api/users/status", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        let response = check_status(response).await?;
        let body: SessionStatusResponse = response.json().await.map_err(|e| ApiError::parse(&e))?;
        Ok(body.authenticated)
    }

    /// GET `/api/tasks/user`: the full task list for the current session.
    pub async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        let url = format!("{}/api/tasks/user", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| ApiError::parse(&e))
    }

    /// POST `/api/tasks`: creates a task with `completed = false`.
    ///
    /// Returns the canonical record with the backend-assigned id.
    pub async fn create_task(&self, draft: &TaskDraft) -> ApiResult<Task> {
        let url = format!("{}/api/tasks", self.base_url);
        let body = CreateTaskRequest {
            title: &draft.title,
            completed: false,
            category: draft.category,
            time: draft.time,
        };
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| ApiError::parse(&e))
    }

    /// PATCH `/api/tasks/{id}`: updates only the completion flag.
    ///
    /// The response body is not authoritative and is discarded.
    pub async fn set_task_completion(&self, id: &str, completed: bool) -> ApiResult<()> {
        let url = format!("{}/api/tasks/{id}", self.base_url);
        let response = self
            .http
            .patch(&url)
            .json(&serde_json::json!({ "completed": completed }))
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        check_status(response).await?;
        Ok(())
    }

    /// GET `/api/users/setup2FA`: fetches the enrollment QR payload.
    pub async fn setup_two_factor(&self) -> ApiResult<TwoFactorSetup> {
        let url = format!("{}/api/users/setup2FA", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| ApiError::parse(&e))
    }

    /// POST `/api/users/verify2FA`: verifies a one-time code.
    pub async fn verify_two_factor(&self, token: &str) -> ApiResult<TwoFactorVerify> {
        let url = format!("{}/api/users/verify2FA", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| ApiError::parse(&e))
    }
}

/// Maps non-2xx responses to [`ApiError::http_status`].
async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::http_status(status.as_u16(), &body))
}
