//! HTTP utilities for control plane REST calls

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Transport-level failure talking to the control plane.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Init(#[source] reqwest::Error),

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote reported the addressed object missing.
    #[error("control plane returned 404 for {url}")]
    NotFound { url: String },

    /// Any non-success status other than 404.
    #[error("control plane returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body was not the JSON we expected.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Credential exchange with the auth service failed.
    #[error("credential exchange failed: {0}")]
    Auth(String),
}

impl ApiError {
    /// True when the failure is the remote reporting the object gone, as
    /// opposed to any other transport or server fault. Drift handling keys
    /// off this distinction.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Decode a JSON response body into a typed model, keeping the request URL
/// in the error.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    url: &str,
    value: Value,
) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Sanitize a response body for logging: truncate long payloads and strip
/// non-printable characters.
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for control plane API calls
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("hcp-adapter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Init)?;

        Ok(Self { client })
    }

    /// Make a GET request against the control plane
    pub async fn get(&self, url: &str, token: &str) -> Result<Value, ApiError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.to_string(),
                source,
            })?;

        Self::read_json(url, response).await
    }

    /// Make a POST request against the control plane
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        Self::read_json(url, response).await
    }

    /// Make a DELETE request against the control plane
    pub async fn delete(&self, url: &str, token: &str) -> Result<Value, ApiError> {
        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.to_string(),
                source,
            })?;

        Self::read_json(url, response).await
    }

    /// Shared status check and body decode. Empty bodies decode to `Null`.
    async fn read_json(url: &str, response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        if status.as_u16() == 404 {
            tracing::debug!("404 for {}", url);
            return Err(ApiError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            // Only log sanitized/truncated error bodies to avoid leaking
            // sensitive data.
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
