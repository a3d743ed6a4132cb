//! Jira REST API client for jt.
//!
//! Covers what submitting a timesheet needs:
//! - Checking that issues exist before anything is written
//! - Adding worklogs, retrying the failures Jira Cloud is known to recover from
//! - Paging through an author's existing worklogs

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

mod dump;
mod upload;

pub use dump::{Author, IssueRef, WorklogRecord};
pub use upload::{UploadOptions, UploadReport};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Delay between attempts of a retried request.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
/// Attempts made for a retryable request before giving up.
pub const REQUEST_ATTEMPTS: usize = 4;

/// Jira client errors.
#[derive(Debug, Error)]
pub enum JiraError {
    /// The configured base URL is unusable.
    #[error("invalid Jira URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: &'static str },
    /// Credentials are missing a required value.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The issue does not exist or is not visible to the user.
    #[error("issue {key} not found")]
    IssueNotFound { key: String },
    /// Jira answered with a non-success status.
    #[error("unexpected status {status} from {path}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },
    /// Failed to decode a response body.
    #[error("invalid response from {path}")]
    InvalidResponse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A retryable request kept failing.
    #[error("{operation} failed after {attempts} attempts")]
    RetriesExhausted {
        operation: String,
        attempts: usize,
        #[source]
        source: Box<JiraError>,
    },
}

impl JiraError {
    /// The HTTP status behind this error, if Jira answered at all.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::IssueNotFound { .. } => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }
}

/// How requests authenticate against Jira.
#[derive(Clone)]
pub enum Credentials {
    /// Account email (or user name) and API token.
    Basic { user: String, api_token: String },
    /// An OAuth 2.0 access token.
    Bearer { token: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("api_token", &"[REDACTED]")
                .finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

impl Credentials {
    fn validate(&self) -> Result<(), JiraError> {
        let (value, reason) = match self {
            Self::Basic { user, .. } if user.trim().is_empty() => (user, "user cannot be empty"),
            Self::Basic { api_token, .. } => (api_token, "API token cannot be empty"),
            Self::Bearer { token } => (token, "access token cannot be empty"),
        };
        if value.trim().is_empty() {
            return Err(JiraError::InvalidCredentials { reason });
        }
        Ok(())
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { user, api_token } => request.basic_auth(user, Some(api_token)),
            Self::Bearer { token } => request.bearer_auth(token),
        }
    }
}

/// Jira REST API client.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    retry_delay: Duration,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the Jira site at `base_url`.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self, JiraError> {
        let url = base_url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(JiraError::InvalidBaseUrl {
                url,
                reason: "URL cannot be empty",
            });
        }
        if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
            return Err(JiraError::InvalidBaseUrl {
                url,
                reason: "URL must start with http:// or https://",
            });
        }
        credentials.validate()?;

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(JiraError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            credentials,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Overrides the delay between retry attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        self.credentials
            .apply(self.http.request(method, url))
            .header("Accept", "application/json")
    }

    /// Sends a request, turning non-success statuses into errors.
    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, JiraError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(path, %status, "Jira request failed");
        Err(JiraError::Status {
            path: path.to_string(),
            status,
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, JiraError> {
        let request = self.request(Method::GET, path).query(query);
        let body = self.send(path, request).await?.text().await?;
        serde_json::from_str(&body).map_err(|source| JiraError::InvalidResponse {
            path: path.to_string(),
            source,
        })
    }

    /// Runs `op` up to [`REQUEST_ATTEMPTS`] times while `retryable` accepts
    /// the error.
    async fn with_retries<T, F, Fut>(
        &self,
        operation: &str,
        retryable: fn(&JiraError) -> bool,
        mut op: F,
    ) -> Result<T, JiraError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, JiraError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if retryable(&err) && attempt < REQUEST_ATTEMPTS => {
                    tracing::warn!(operation, attempt, error = %err, "retrying Jira request");
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(err) if retryable(&err) => {
                    return Err(JiraError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
