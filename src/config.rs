//! Adapter configuration
//!
//! Credentials and default coordinates come from a JSON config file under
//! the user config dir, overridden field by field with `HCP_*` environment
//! variables. Empty values are treated as unset everywhere, so exporting
//! `HCP_PROJECT_ID=""` does not shadow a configured project.

use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Default control plane API host.
const DEFAULT_API_HOST: &str = "api.cloud.hashicorp.com";
/// Default OAuth2 token endpoint base.
const DEFAULT_AUTH_URL: &str = "https://auth.idp.hashicorp.com";

/// Operator-supplied configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Service principal client ID
    #[serde(default)]
    pub client_id: Option<String>,
    /// Service principal client secret
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Static access token, bypassing the credential exchange
    #[serde(default)]
    pub access_token: Option<String>,
    /// Default project for resources that do not set their own
    #[serde(default)]
    pub project_id: Option<String>,
    /// Control plane API host or base URL override
    #[serde(default)]
    pub api_host: Option<String>,
    /// OAuth2 token endpoint base URL override
    #[serde(default)]
    pub auth_url: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hcp-adapter").join("config.json"))
    }

    /// Load configuration: file first, then environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env();
        config.normalize();
        config
    }

    fn load_file() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!("ignoring unparseable config file {}: {err}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Overlay `HCP_*` environment variables onto the loaded file values.
    fn apply_env(&mut self) {
        if let Some(value) = env_value("HCP_CLIENT_ID") {
            self.client_id = Some(value);
        }
        if let Some(value) = env_value("HCP_CLIENT_SECRET") {
            self.client_secret = Some(value);
        }
        if let Some(value) = env_value("HCP_ACCESS_TOKEN") {
            self.access_token = Some(value);
        }
        if let Some(value) = env_value("HCP_PROJECT_ID") {
            self.project_id = Some(value);
        }
        if let Some(value) = env_value("HCP_API_HOST") {
            self.api_host = Some(value);
        }
        if let Some(value) = env_value("HCP_AUTH_URL") {
            self.auth_url = Some(value);
        }
    }

    /// Collapse empty strings to `None` across all fields.
    fn normalize(&mut self) {
        for slot in [
            &mut self.client_id,
            &mut self.client_secret,
            &mut self.access_token,
            &mut self.project_id,
            &mut self.api_host,
            &mut self.auth_url,
        ] {
            if slot.as_deref().is_some_and(str::is_empty) {
                *slot = None;
            }
        }
    }

    /// Effective API base URL, scheme included, no trailing slash.
    pub fn api_base(&self) -> String {
        match self.api_host.as_deref().and_then(normalize_endpoint) {
            Some(base) => base,
            None => {
                if self.api_host.is_some() {
                    tracing::warn!(
                        "invalid API host override, falling back to {DEFAULT_API_HOST}"
                    );
                }
                format!("https://{DEFAULT_API_HOST}")
            }
        }
    }

    /// Effective token endpoint base URL, no trailing slash.
    pub fn auth_base(&self) -> String {
        match self.auth_url.as_deref().and_then(normalize_endpoint) {
            Some(base) => base,
            None => {
                if self.auth_url.is_some() {
                    tracing::warn!("invalid auth URL override, falling back to {DEFAULT_AUTH_URL}");
                }
                DEFAULT_AUTH_URL.to_string()
            }
        }
    }
}

/// Environment variable value, with empty strings treated as unset.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Validate an endpoint override and normalize it to `scheme://host[:port]`
/// form without a trailing slash. Bare hostnames get `https://`.
fn normalize_endpoint(raw: &str) -> Option<String> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    Url::parse(&candidate).ok()?;
    Some(candidate.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_defaults_when_unset() {
        let config = Config::default();
        assert_eq!(config.api_base(), "https://api.cloud.hashicorp.com");
        assert_eq!(config.auth_base(), "https://auth.idp.hashicorp.com");
    }

    #[test]
    fn test_api_base_accepts_bare_host() {
        let config = Config {
            api_host: Some("api.example.test".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_base(), "https://api.example.test");
    }

    #[test]
    fn test_api_base_keeps_explicit_scheme_and_port() {
        let config = Config {
            api_host: Some("http://127.0.0.1:8080/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_base(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_endpoint_falls_back_to_default() {
        let config = Config {
            api_host: Some("http://".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_base(), "https://api.cloud.hashicorp.com");
    }

    #[test]
    fn test_normalize_clears_empty_fields() {
        let mut config = Config {
            client_id: Some(String::new()),
            project_id: Some("proj-1".to_string()),
            ..Default::default()
        };
        config.normalize();
        assert_eq!(config.client_id, None);
        assert_eq!(config.project_id.as_deref(), Some("proj-1"));
    }
}
