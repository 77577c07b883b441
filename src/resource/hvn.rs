//! HVN resource
//!
//! A HashiCorp Virtual Network is the network-family root object; peerings
//! and routes hang off one. The durable identifier is the HVN's canonical
//! link URL, also exposed as the `self_link` attribute.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{require_scope, AdapterError, NetworkLocation};
use crate::hcp::client::HcpClient;
use crate::hcp::http::decode;
use crate::identity::{IdentityError, Link, Location};
use crate::state::{set_location_attributes, sync_location, AttributeStore, StateError};

/// Engine-facing type key
pub const TYPE_KEY: &str = "hcp_hvn";
/// Namespaced type embedded in link URLs
pub const LINK_TYPE: &str = "hashicorp.network.hvn";

/// Remote HVN record.
#[derive(Debug, Clone, Deserialize)]
pub struct Hvn {
    pub id: String,
    #[serde(default)]
    pub cidr_block: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: NetworkLocation,
}

#[derive(Debug, Deserialize)]
struct HvnResponse {
    network: Hvn,
}

/// Create the HVN declared in state and record its identity.
pub async fn create(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;
    let location = sync_location(store, scope)?;

    let hvn_id = store
        .get("hvn_id")
        .ok_or(AdapterError::MissingAttribute("hvn_id"))?;
    let cloud_provider = store
        .get("cloud_provider")
        .ok_or(AdapterError::MissingAttribute("cloud_provider"))?;
    let region = store
        .get("region")
        .ok_or(AdapterError::MissingAttribute("region"))?;
    let cidr_block = store.get("cidr_block");

    // Identity must encode cleanly before anything is sent remote.
    let link = Link::new(LINK_TYPE, &hvn_id, location.clone());
    let self_link = link.canonical_url()?;

    let organization_id = location
        .organization_id
        .as_deref()
        .ok_or(StateError::MissingOrganizationId)?;

    let mut network = json!({
        "id": hvn_id,
        "location": {
            "organization_id": organization_id,
            "project_id": location.project_id,
            "region": { "provider": cloud_provider, "region": region },
        },
    });
    if let Some(cidr) = &cidr_block {
        network["cidr_block"] = json!(cidr);
    }

    let url = client.network_url(organization_id, &location.project_id, "networks");
    let response = client.post(&url, Some(&json!({ "network": network }))).await?;
    let parsed: HvnResponse = decode(&url, response)?;

    store.set_id(&self_link);
    store.set("self_link", &self_link);
    write_attributes(store, &parsed.network);

    tracing::info!("Created HVN {}", self_link);
    Ok(())
}

/// Refresh state from the remote HVN. A missing remote clears state so the
/// engine plans a re-create.
pub async fn read(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;
    let self_link = store.id().ok_or(AdapterError::MissingId)?;
    let link = Link::from_url(&self_link, Some(LINK_TYPE))?;

    let url = client.network_url(
        &scope.organization_id,
        &link.location.project_id,
        &format!("networks/{}", link.id),
    );
    let response = match client.get(&url).await {
        Ok(response) => response,
        Err(err) if err.is_not_found() => {
            tracing::warn!("HVN {} no longer exists, removing from state", link.id);
            store.clear();
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let parsed: HvnResponse = decode(&url, response)?;

    let location = Location::new(scope.organization_id.clone(), link.location.project_id);
    set_location_attributes(store, &location)?;
    store.set("hvn_id", &parsed.network.id);
    store.set("self_link", &self_link);
    write_attributes(store, &parsed.network);
    Ok(())
}

/// Delete the HVN. Already-gone remotes are treated as success.
pub async fn delete(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;
    let self_link = store.id().ok_or(AdapterError::MissingId)?;
    let link = Link::from_url(&self_link, Some(LINK_TYPE))?;

    let url = client.network_url(
        &scope.organization_id,
        &link.location.project_id,
        &format!("networks/{}", link.id),
    );
    match client.delete(&url).await {
        Ok(_) => {}
        Err(err) if err.is_not_found() => {
            tracing::warn!("HVN {} already deleted", link.id);
        }
        Err(err) => return Err(err.into()),
    }

    store.clear();
    tracing::info!("Deleted HVN {}", link.id);
    Ok(())
}

/// Adopt an existing HVN into state.
///
/// Accepts `{hvn_id}`, scoped to the default project, or
/// `{project_id}:{hvn_id}` for another project. The follow-up read fills
/// every remaining attribute.
pub async fn import(
    client: &HcpClient,
    store: &mut dyn AttributeStore,
    import_id: &str,
) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;

    let parts: Vec<&str> = import_id.split(':').collect();
    let (project_id, hvn_id) = match parts.as_slice() {
        [hvn_id] if !hvn_id.is_empty() => (scope.project_id.clone(), hvn_id.to_string()),
        [project_id, hvn_id] if !project_id.is_empty() && !hvn_id.is_empty() => {
            (project_id.to_string(), hvn_id.to_string())
        }
        _ => {
            return Err(IdentityError::MalformedId {
                id: import_id.to_string(),
                expected: "{hvn_id} or {project_id}:{hvn_id}".to_string(),
            }
            .into())
        }
    };

    let link = Link::new(LINK_TYPE, &hvn_id, Location::for_project(project_id));
    store.set_id(&link.canonical_url()?);
    store.set("hvn_id", &hvn_id);

    read(client, store).await
}

/// Serve the HVN data source: look up by `hvn_id` (and optional project)
/// and publish the full record.
pub async fn read_data_source(
    client: &HcpClient,
    store: &mut dyn AttributeStore,
) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;
    let hvn_id = store
        .get("hvn_id")
        .ok_or(AdapterError::MissingAttribute("hvn_id"))?;
    let location = sync_location(store, scope)?;

    let link = Link::new(LINK_TYPE, &hvn_id, location.clone());
    let self_link = link.canonical_url()?;

    let organization_id = location
        .organization_id
        .as_deref()
        .ok_or(StateError::MissingOrganizationId)?;
    let url = client.network_url(
        organization_id,
        &location.project_id,
        &format!("networks/{}", hvn_id),
    );
    // Unlike resource reads, a missing remote here is a hard error.
    let response = client.get(&url).await?;
    let parsed: HvnResponse = decode(&url, response)?;

    store.set_id(&self_link);
    store.set("self_link", &self_link);
    write_attributes(store, &parsed.network);
    Ok(())
}

/// Copy computed attributes from a remote record into state.
fn write_attributes(store: &mut dyn AttributeStore, hvn: &Hvn) {
    store.set("cidr_block", &hvn.cidr_block);
    store.set("state", &hvn.state);
    if let Some(created_at) = &hvn.created_at {
        store.set("created_at", &created_at.to_rfc3339());
    }
    if let Some(region) = &hvn.location.region {
        store.set("cloud_provider", &region.provider);
        store.set("region", &region.region);
    }
}
