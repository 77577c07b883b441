//! HVN peering resource
//!
//! Connects two HVNs. State holds the source and target HVNs as link URLs
//! (`hvn_1`, `hvn_2`); the peering itself lives under the source HVN and
//! shares its project. Imports accept the legacy colon-delimited composite
//! ID.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{hvn, require_scope, AdapterError, NetworkLocation};
use crate::hcp::client::HcpClient;
use crate::hcp::http::decode;
use crate::identity::{parse_composite_id, Link, Location};
use crate::state::{set_location_attributes, AttributeStore, StateError};

/// Engine-facing type key
pub const TYPE_KEY: &str = "hcp_hvn_peering_connection";
/// Namespaced type embedded in link URLs
pub const LINK_TYPE: &str = "hashicorp.network.peering";

/// Remote peering record.
#[derive(Debug, Clone, Deserialize)]
pub struct Peering {
    pub id: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hvn: Option<HvnRef>,
    #[serde(default)]
    pub target: Option<PeeringTarget>,
}

/// Pointer to an HVN inside a peering payload.
#[derive(Debug, Clone, Deserialize)]
pub struct HvnRef {
    pub id: String,
    #[serde(default)]
    pub location: NetworkLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeeringTarget {
    #[serde(default)]
    pub hvn_target: Option<HvnTarget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HvnTarget {
    pub hvn: HvnRef,
}

#[derive(Debug, Deserialize)]
struct PeeringResponse {
    peering: Peering,
}

/// Create the peering declared in state and record its identity.
pub async fn create(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;

    let peering_id = store
        .get("peering_id")
        .ok_or(AdapterError::MissingAttribute("peering_id"))?;
    let hvn_1 = store
        .get("hvn_1")
        .ok_or(AdapterError::MissingAttribute("hvn_1"))?;
    let hvn_2 = store
        .get("hvn_2")
        .ok_or(AdapterError::MissingAttribute("hvn_2"))?;

    // Both ends must decode before anything is sent remote.
    let source = Link::from_url(&hvn_1, Some(hvn::LINK_TYPE))?;
    let target = Link::from_url(&hvn_2, Some(hvn::LINK_TYPE))?;

    // The peering lives under the source HVN and shares its project.
    let location = Location::new(
        scope.organization_id.clone(),
        source.location.project_id.clone(),
    );
    set_location_attributes(store, &location)?;

    let link = Link::new(LINK_TYPE, &peering_id, location.clone());
    let self_link = link.canonical_url()?;

    let organization_id = location
        .organization_id
        .as_deref()
        .ok_or(StateError::MissingOrganizationId)?;

    let body = json!({
        "peering": {
            "id": peering_id,
            "target": {
                "hvn_target": {
                    "hvn": {
                        "id": target.id,
                        "location": {
                            "organization_id": organization_id,
                            "project_id": target.location.project_id,
                        },
                    },
                },
            },
        },
    });

    let url = client.network_url(
        organization_id,
        &location.project_id,
        &format!("networks/{}/peerings", source.id),
    );
    let response = client.post(&url, Some(&body)).await?;
    let parsed: PeeringResponse = decode(&url, response)?;

    store.set_id(&self_link);
    store.set("self_link", &self_link);
    write_attributes(store, &parsed.peering)?;

    tracing::info!("Created peering {}", self_link);
    Ok(())
}

/// Refresh state from the remote peering. A missing remote clears state.
pub async fn read(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;
    let self_link = store.id().ok_or(AdapterError::MissingId)?;
    let link = Link::from_url(&self_link, Some(LINK_TYPE))?;

    let hvn_1 = store
        .get("hvn_1")
        .ok_or(AdapterError::MissingAttribute("hvn_1"))?;
    let source = Link::from_url(&hvn_1, Some(hvn::LINK_TYPE))?;

    let url = client.network_url(
        &scope.organization_id,
        &link.location.project_id,
        &format!("networks/{}/peerings/{}", source.id, link.id),
    );
    let response = match client.get(&url).await {
        Ok(response) => response,
        Err(err) if err.is_not_found() => {
            tracing::warn!("Peering {} no longer exists, removing from state", link.id);
            store.clear();
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let parsed: PeeringResponse = decode(&url, response)?;

    let location = Location::new(scope.organization_id.clone(), link.location.project_id);
    set_location_attributes(store, &location)?;
    store.set("self_link", &self_link);
    write_attributes(store, &parsed.peering)?;
    Ok(())
}

/// Delete the peering. Already-gone remotes are treated as success.
pub async fn delete(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;
    let self_link = store.id().ok_or(AdapterError::MissingId)?;
    let link = Link::from_url(&self_link, Some(LINK_TYPE))?;

    let hvn_1 = store
        .get("hvn_1")
        .ok_or(AdapterError::MissingAttribute("hvn_1"))?;
    let source = Link::from_url(&hvn_1, Some(hvn::LINK_TYPE))?;

    let url = client.network_url(
        &scope.organization_id,
        &link.location.project_id,
        &format!("networks/{}/peerings/{}", source.id, link.id),
    );
    match client.delete(&url).await {
        Ok(_) => {}
        Err(err) if err.is_not_found() => {
            tracing::warn!("Peering {} already deleted", link.id);
        }
        Err(err) => return Err(err.into()),
    }

    store.clear();
    tracing::info!("Deleted peering {}", link.id);
    Ok(())
}

/// Adopt an existing peering into state.
///
/// Accepts the composite forms `{hvn_id}:{peering_id}` (default project)
/// and `{project_id}:{hvn_id}:{peering_id}`. Identity is rebuilt from the
/// composite before any remote call; the follow-up read fills the rest.
pub async fn import(
    client: &HcpClient,
    store: &mut dyn AttributeStore,
    import_id: &str,
) -> Result<(), AdapterError> {
    let (project_id, hvn_id, peering_id) =
        parse_composite_id(import_id, client.default_project_id())?;
    let location = Location::for_project(project_id);

    let link = Link::new(LINK_TYPE, &peering_id, location.clone());
    store.set_id(&link.canonical_url()?);

    let source = Link::new(hvn::LINK_TYPE, &hvn_id, location);
    store.set("hvn_1", &source.canonical_url()?);
    store.set("peering_id", &peering_id);

    read(client, store).await
}

/// Copy computed attributes from a remote record into state, rebuilding
/// the HVN link attributes from the payload's pointers.
fn write_attributes(store: &mut dyn AttributeStore, peering: &Peering) -> Result<(), AdapterError> {
    store.set("peering_id", &peering.id);
    store.set("state", &peering.state);
    if let Some(created_at) = &peering.created_at {
        store.set("created_at", &created_at.to_rfc3339());
    }

    if let Some(source) = &peering.hvn {
        if let Some(url) = hvn_ref_link(source)? {
            store.set("hvn_1", &url);
        }
    }
    if let Some(target) = peering.target.as_ref().and_then(|t| t.hvn_target.as_ref()) {
        if let Some(url) = hvn_ref_link(&target.hvn)? {
            store.set("hvn_2", &url);
        }
    }
    Ok(())
}

/// Canonical link URL for an HVN pointer, if the payload carried enough to
/// build one.
fn hvn_ref_link(reference: &HvnRef) -> Result<Option<String>, AdapterError> {
    if reference.location.project_id.is_empty() {
        return Ok(None);
    }
    let link = Link::new(
        hvn::LINK_TYPE,
        &reference.id,
        Location::for_project(reference.location.project_id.clone()),
    );
    Ok(Some(link.canonical_url()?))
}
