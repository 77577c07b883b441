//! Control plane API interaction module
//!
//! This module provides the core functionality for talking to the HCP
//! APIs: authentication, HTTP plumbing, and the resource-manager hierarchy.
//!
//! # Module Structure
//!
//! - [`auth`] - OAuth2 client-credentials exchange with token caching
//! - [`client`] - Main client combining auth, transport, and default scope
//! - [`http`] - HTTP utilities for REST API calls
//! - [`organizations`] - Organization listing
//! - [`projects`] - Project fetching, listing, and oldest-project selection
//!
//! # Example
//!
//! ```ignore
//! use crate::config::Config;
//! use crate::hcp::client::HcpClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = HcpClient::new(&Config::load())?;
//!     let orgs = crate::hcp::organizations::list_organizations(&client).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod organizations;
pub mod projects;

use serde::Deserialize;

/// Pagination envelope shared by list responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Pagination {
    /// The token for the next page, with empty tokens meaning "done".
    pub fn into_next_token(self) -> Option<String> {
        self.next_page_token.filter(|token| !token.is_empty())
    }
}
