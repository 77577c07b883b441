//! Managed resources
//!
//! Glue between the declarative engine and the control plane for the
//! network resource family. Each resource module implements the engine
//! verbs against its API endpoints; [`dispatch`] routes an engine request
//! to the right module.
//!
//! None of the network resources support in-place update: every attribute
//! change forces replacement, and [`Operation::Update`] is refused.

pub mod hvn;
pub mod peering;
pub mod route;

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::hcp::client::HcpClient;
use crate::hcp::http::ApiError;
use crate::identity::IdentityError;
use crate::scope::Scope;
use crate::state::{AttributeStore, StateError};

/// Failure while running a resource operation.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("adapter scope is not configured; configure it before resource operations")]
    NotConfigured,

    #[error("resource has no identifier in state")]
    MissingId,

    #[error("required attribute {0:?} is not set")]
    MissingAttribute(&'static str),

    #[error("unknown resource type {0:?}")]
    UnknownType(String),

    #[error("{0} does not support in-place update; changed attributes force replacement")]
    UpdateUnsupported(&'static str),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Engine verbs the adapter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    Create,
    Read,
    Update,
    Delete,
    /// Import an existing remote object, addressed by an operator-typed ID.
    Import(&'a str),
}

/// Location block echoed on network-family payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkLocation {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub region: Option<Region>,
}

/// Cloud region inside a [`NetworkLocation`].
#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub region: String,
}

/// Static description of one managed resource type, consumed by the engine.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// Engine-facing type key
    pub key: &'static str,
    /// Namespaced type embedded in link URLs
    pub link_type: &'static str,
    /// Engine-side deadline hints per verb
    pub create_timeout: Duration,
    pub delete_timeout: Duration,
    pub default_timeout: Duration,
}

/// Every resource type the adapter manages.
pub const DESCRIPTORS: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        key: hvn::TYPE_KEY,
        link_type: hvn::LINK_TYPE,
        create_timeout: Duration::from_secs(10 * 60),
        delete_timeout: Duration::from_secs(10 * 60),
        default_timeout: Duration::from_secs(60),
    },
    ResourceDescriptor {
        key: peering::TYPE_KEY,
        link_type: peering::LINK_TYPE,
        create_timeout: Duration::from_secs(35 * 60),
        delete_timeout: Duration::from_secs(35 * 60),
        default_timeout: Duration::from_secs(60),
    },
    ResourceDescriptor {
        key: route::TYPE_KEY,
        link_type: route::LINK_TYPE,
        create_timeout: Duration::from_secs(10 * 60),
        delete_timeout: Duration::from_secs(10 * 60),
        default_timeout: Duration::from_secs(60),
    },
];

/// Get a resource descriptor by engine type key
pub fn descriptor(key: &str) -> Option<&'static ResourceDescriptor> {
    DESCRIPTORS.iter().find(|descriptor| descriptor.key == key)
}

/// The frozen default scope, required before any resource operation.
pub(crate) fn require_scope(client: &HcpClient) -> Result<&Scope, AdapterError> {
    client.scope().ok_or(AdapterError::NotConfigured)
}

/// Route an engine-requested operation to the matching resource module.
pub async fn dispatch(
    operation: Operation<'_>,
    key: &str,
    client: &HcpClient,
    store: &mut dyn AttributeStore,
) -> Result<(), AdapterError> {
    tracing::debug!("dispatch: operation={:?}, resource={}", operation, key);

    match key {
        hvn::TYPE_KEY => match operation {
            Operation::Create => hvn::create(client, store).await,
            Operation::Read => hvn::read(client, store).await,
            Operation::Update => Err(AdapterError::UpdateUnsupported(hvn::TYPE_KEY)),
            Operation::Delete => hvn::delete(client, store).await,
            Operation::Import(id) => hvn::import(client, store, id).await,
        },
        peering::TYPE_KEY => match operation {
            Operation::Create => peering::create(client, store).await,
            Operation::Read => peering::read(client, store).await,
            Operation::Update => Err(AdapterError::UpdateUnsupported(peering::TYPE_KEY)),
            Operation::Delete => peering::delete(client, store).await,
            Operation::Import(id) => peering::import(client, store, id).await,
        },
        route::TYPE_KEY => match operation {
            Operation::Create => route::create(client, store).await,
            Operation::Read => route::read(client, store).await,
            Operation::Update => Err(AdapterError::UpdateUnsupported(route::TYPE_KEY)),
            Operation::Delete => route::delete(client, store).await,
            Operation::Import(id) => route::import(client, store, id).await,
        },
        _ => Err(AdapterError::UnknownType(key.to_string())),
    }
}

/// Serve a data source read for types that publish one.
pub async fn read_data_source(
    key: &str,
    client: &HcpClient,
    store: &mut dyn AttributeStore,
) -> Result<(), AdapterError> {
    tracing::debug!("read_data_source: resource={}", key);

    match key {
        hvn::TYPE_KEY => hvn::read_data_source(client, store).await,
        _ => Err(AdapterError::UnknownType(key.to_string())),
    }
}
