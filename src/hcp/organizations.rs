//! Organizations
//!
//! Functions for listing the organizations visible to the configured
//! credentials.

use serde::Deserialize;

use super::client::HcpClient;
use super::http::{decode, ApiError};
use super::Pagination;

/// An organization in the control plane resource hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ListOrganizationsResponse {
    #[serde(default)]
    organizations: Vec<Organization>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// List all organizations the credentials grant access to (auto-paginate).
pub async fn list_organizations(client: &HcpClient) -> Result<Vec<Organization>, ApiError> {
    let mut all = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut url = client.resource_manager_url("organizations");
        if let Some(token) = page_token.as_deref() {
            url = format!("{url}?pagination.next_page_token={}", urlencoding::encode(token));
        }

        let response = client.get(&url).await?;
        let page: ListOrganizationsResponse = decode(&url, response)?;
        all.extend(page.organizations);

        page_token = page.pagination.and_then(Pagination::into_next_token);
        if page_token.is_none() {
            break;
        }
    }

    tracing::debug!("Listed {} organizations", all.len());
    Ok(all)
}
