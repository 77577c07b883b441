//! Control plane client
//!
//! Main client for talking to the HCP APIs, combining authentication, HTTP
//! plumbing, and the adapter's default scope once it has been resolved.

use std::sync::OnceLock;

use serde_json::Value;

use super::auth::Credentials;
use super::http::{ApiError, HttpClient};
use crate::config::Config;
use crate::scope::Scope;

/// Resource-manager API version the adapter speaks
const RESOURCE_MANAGER_VERSION: &str = "2019-12-10";
/// Network API version the adapter speaks
const NETWORK_VERSION: &str = "2020-09-07";

/// Main control plane client
#[derive(Debug)]
pub struct HcpClient {
    credentials: Credentials,
    http: HttpClient,
    api_base: String,
    configured_project_id: Option<String>,
    scope: OnceLock<Scope>,
}

impl HcpClient {
    /// Create a client from operator configuration.
    ///
    /// A static access token takes precedence over a service principal.
    /// With neither configured this fails; every control plane call needs
    /// credentials.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let credentials = if let Some(token) = &config.access_token {
            tracing::debug!("Using static access token");
            Credentials::static_token(token)
        } else {
            match (&config.client_id, &config.client_secret) {
                (Some(id), Some(secret)) => {
                    Credentials::client_secret(id, secret, &config.auth_base())?
                }
                _ => {
                    return Err(ApiError::Auth(
                        "no credentials configured; set a client ID and secret or an access token"
                            .to_string(),
                    ))
                }
            }
        };

        Ok(Self {
            credentials,
            http: HttpClient::new()?,
            api_base: config.api_base(),
            configured_project_id: config.project_id.clone(),
            scope: OnceLock::new(),
        })
    }

    /// Project pinned in configuration ahead of scope resolution, if any.
    pub fn configured_project_id(&self) -> Option<&str> {
        self.configured_project_id.as_deref()
    }

    /// The resolved default scope, once configuration has frozen it.
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.get()
    }

    /// Default project for resources that do not pin their own.
    pub fn default_project_id(&self) -> Option<&str> {
        self.scope().map(|scope| scope.project_id.as_str())
    }

    /// Organization every managed resource belongs to.
    pub fn default_organization_id(&self) -> Option<&str> {
        self.scope().map(|scope| scope.organization_id.as_str())
    }

    /// Freeze the default scope. Returns the rejected scope when one is
    /// already in place.
    pub(crate) fn freeze_scope(&self, scope: Scope) -> Result<(), Scope> {
        self.scope.set(scope)
    }

    /// Make a GET request against the control plane
    pub async fn get(&self, url: &str) -> Result<Value, ApiError> {
        let token = self.credentials.token().await?;
        self.http.get(url, &token).await
    }

    /// Make a POST request against the control plane
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let token = self.credentials.token().await?;
        self.http.post(url, &token, body).await
    }

    /// Make a DELETE request against the control plane
    pub async fn delete(&self, url: &str) -> Result<Value, ApiError> {
        let token = self.credentials.token().await?;
        self.http.delete(url, &token).await
    }

    // =========================================================================
    // Resource Manager API helpers
    // =========================================================================

    /// Build a resource-manager API URL
    pub fn resource_manager_url(&self, path: &str) -> String {
        format!(
            "{}/resource-manager/{}/{}",
            self.api_base, RESOURCE_MANAGER_VERSION, path
        )
    }

    // =========================================================================
    // Network API helpers
    // =========================================================================

    /// Build a network API URL scoped to an organization and project
    pub fn network_url(&self, organization_id: &str, project_id: &str, path: &str) -> String {
        format!(
            "{}/network/{}/organizations/{}/projects/{}/{}",
            self.api_base, NETWORK_VERSION, organization_id, project_id, path
        )
    }
}
