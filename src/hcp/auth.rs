//! Control plane authentication
//!
//! Service principals authenticate through an OAuth2 client-credentials
//! exchange against the HCP auth service. Tokens are cached and refreshed
//! shortly before expiry. A static token can be supplied instead, which
//! skips the exchange entirely.

use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::http::{sanitize_for_log, ApiError};

/// OAuth2 audience claimed for control plane tokens
const TOKEN_AUDIENCE: &str = "https://api.hashicorp.cloud";

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if the auth service omits expires_in (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Credential holder with token caching
#[derive(Debug, Clone)]
pub struct Credentials {
    source: Arc<CredentialSource>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Debug)]
enum CredentialSource {
    /// Service principal exchanged at the auth service
    ClientSecret {
        client_id: String,
        client_secret: String,
        token_url: String,
        http: reqwest::Client,
    },
    /// Fixed token supplied by the operator
    Static(String),
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl Credentials {
    /// Credentials for a service principal. `auth_base` is the token
    /// endpoint base URL, without the `/oauth2/token` path.
    pub fn client_secret(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_base: &str,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hcp-adapter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Init)?;

        Ok(Self {
            source: Arc::new(CredentialSource::ClientSecret {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                token_url: format!("{auth_base}/oauth2/token"),
                http,
            }),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Credentials wrapping a fixed token.
    pub fn static_token(token: impl Into<String>) -> Self {
        Self {
            source: Arc::new(CredentialSource::Static(token.into())),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls, reusing the cached one while it
    /// is still valid.
    pub async fn token(&self) -> Result<String, ApiError> {
        let (client_id, client_secret, token_url, http) = match self.source.as_ref() {
            CredentialSource::Static(token) => return Ok(token.clone()),
            CredentialSource::ClientSecret {
                client_id,
                client_secret,
                token_url,
                http,
            } => (client_id, client_secret, token_url, http),
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let (token, ttl) = exchange(http, token_url, client_id, client_secret).await?;
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    /// Force a refresh, dropping any cached token first.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.token().await
    }
}

/// Run the client-credentials exchange, returning the token and its TTL.
async fn exchange(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<(String, Duration), ApiError> {
    tracing::debug!("POST {}", token_url);

    let response = http
        .post(token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("audience", TOKEN_AUDIENCE),
        ])
        .send()
        .await
        .map_err(|err| ApiError::Auth(format!("token request failed: {err}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ApiError::Auth(format!("failed to read token response: {err}")))?;

    if !status.is_success() {
        tracing::error!("Auth error: {} - {}", status, sanitize_for_log(&body));
        return Err(ApiError::Auth(format!(
            "token endpoint returned {status}; check the configured client ID and secret"
        )));
    }

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|err| ApiError::Auth(format!("failed to parse token response: {err}")))?;

    let ttl = parsed
        .expires_in
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_TTL);

    Ok((parsed.access_token, ttl))
}
