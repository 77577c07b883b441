//! HVN route resource
//!
//! A routing rule attached to an HVN: traffic for `destination_cidr` is
//! sent to a target connection (a peering or other attachment), both given
//! as link URLs in state.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::{hvn, require_scope, AdapterError};
use crate::hcp::client::HcpClient;
use crate::hcp::http::decode;
use crate::identity::{parse_composite_id, Link, Location};
use crate::state::{set_location_attributes, AttributeStore, StateError};

/// Engine-facing type key
pub const TYPE_KEY: &str = "hcp_hvn_route";
/// Namespaced type embedded in link URLs
pub const LINK_TYPE: &str = "hashicorp.network.route";

/// Remote route record.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub id: String,
    #[serde(default)]
    pub destination_cidr: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    route: Route,
}

/// Create the route declared in state and record its identity.
pub async fn create(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;

    let route_id = store
        .get("hvn_route_id")
        .ok_or(AdapterError::MissingAttribute("hvn_route_id"))?;
    let hvn_link = store
        .get("hvn_link")
        .ok_or(AdapterError::MissingAttribute("hvn_link"))?;
    let destination = store
        .get("destination_cidr")
        .ok_or(AdapterError::MissingAttribute("destination_cidr"))?;
    let target_link = store
        .get("target_link")
        .ok_or(AdapterError::MissingAttribute("target_link"))?;

    let parent = Link::from_url(&hvn_link, Some(hvn::LINK_TYPE))?;
    // The target may be any connection type; take the type from its URL.
    let target = Link::from_url(&target_link, None)?;

    let location = Location::new(
        scope.organization_id.clone(),
        parent.location.project_id.clone(),
    );
    set_location_attributes(store, &location)?;

    let link = Link::new(LINK_TYPE, &route_id, location.clone());
    let self_link = link.canonical_url()?;

    let organization_id = location
        .organization_id
        .as_deref()
        .ok_or(StateError::MissingOrganizationId)?;

    let body = json!({
        "route": {
            "id": route_id,
            "destination_cidr": destination,
            "target": {
                "hvn_connection": { "type": target.resource_type, "id": target.id },
            },
        },
    });

    let url = client.network_url(
        organization_id,
        &location.project_id,
        &format!("networks/{}/routes", parent.id),
    );
    let response = client.post(&url, Some(&body)).await?;
    let parsed: RouteResponse = decode(&url, response)?;

    store.set_id(&self_link);
    store.set("self_link", &self_link);
    write_attributes(store, &parsed.route);

    tracing::info!("Created HVN route {}", self_link);
    Ok(())
}

/// Refresh state from the remote route. A missing remote clears state.
pub async fn read(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;
    let self_link = store.id().ok_or(AdapterError::MissingId)?;
    let link = Link::from_url(&self_link, Some(LINK_TYPE))?;

    let hvn_link = store
        .get("hvn_link")
        .ok_or(AdapterError::MissingAttribute("hvn_link"))?;
    let parent = Link::from_url(&hvn_link, Some(hvn::LINK_TYPE))?;

    let url = client.network_url(
        &scope.organization_id,
        &link.location.project_id,
        &format!("networks/{}/routes/{}", parent.id, link.id),
    );
    let response = match client.get(&url).await {
        Ok(response) => response,
        Err(err) if err.is_not_found() => {
            tracing::warn!("HVN route {} no longer exists, removing from state", link.id);
            store.clear();
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let parsed: RouteResponse = decode(&url, response)?;

    let location = Location::new(scope.organization_id.clone(), link.location.project_id);
    set_location_attributes(store, &location)?;
    store.set("self_link", &self_link);
    store.set("hvn_link", &hvn_link);
    write_attributes(store, &parsed.route);
    Ok(())
}

/// Delete the route. Already-gone remotes are treated as success.
pub async fn delete(client: &HcpClient, store: &mut dyn AttributeStore) -> Result<(), AdapterError> {
    let scope = require_scope(client)?;
    let self_link = store.id().ok_or(AdapterError::MissingId)?;
    let link = Link::from_url(&self_link, Some(LINK_TYPE))?;

    let hvn_link = store
        .get("hvn_link")
        .ok_or(AdapterError::MissingAttribute("hvn_link"))?;
    let parent = Link::from_url(&hvn_link, Some(hvn::LINK_TYPE))?;

    let url = client.network_url(
        &scope.organization_id,
        &link.location.project_id,
        &format!("networks/{}/routes/{}", parent.id, link.id),
    );
    match client.delete(&url).await {
        Ok(_) => {}
        Err(err) if err.is_not_found() => {
            tracing::warn!("HVN route {} already deleted", link.id);
        }
        Err(err) => return Err(err.into()),
    }

    store.clear();
    tracing::info!("Deleted HVN route {}", link.id);
    Ok(())
}

/// Adopt an existing route into state.
///
/// Accepts the composite forms `{hvn_id}:{route_id}` (default project) and
/// `{project_id}:{hvn_id}:{route_id}`. The parent HVN link is rebuilt from
/// the composite; the follow-up read fills the rest.
pub async fn import(
    client: &HcpClient,
    store: &mut dyn AttributeStore,
    import_id: &str,
) -> Result<(), AdapterError> {
    let (project_id, hvn_id, route_id) =
        parse_composite_id(import_id, client.default_project_id())?;
    let location = Location::for_project(project_id);

    let link = Link::new(LINK_TYPE, &route_id, location.clone());
    store.set_id(&link.canonical_url()?);

    let parent = Link::new(hvn::LINK_TYPE, &hvn_id, location);
    store.set("hvn_link", &parent.canonical_url()?);
    store.set("hvn_route_id", &route_id);

    read(client, store).await
}

/// Copy computed attributes from a remote record into state.
fn write_attributes(store: &mut dyn AttributeStore, route: &Route) {
    store.set("hvn_route_id", &route.id);
    store.set("destination_cidr", &route.destination_cidr);
    store.set("state", &route.state);
    if let Some(created_at) = &route.created_at {
        store.set("created_at", &created_at.to_rfc3339());
    }
}
