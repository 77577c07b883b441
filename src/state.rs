//! Persisted state bridge
//!
//! The declarative engine owns durable resource state; the adapter reads
//! and writes it through the [`AttributeStore`] seam as flat string
//! attributes plus a resource identifier. Location coordinates go through
//! the helpers here so that only UUID-shaped IDs ever reach state.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::identity::{resolve_project_id, IdentityError, Location};
use crate::scope::Scope;

/// Attribute key for the owning organization.
pub const ORGANIZATION_ID: &str = "organization_id";
/// Attribute key for the owning project.
pub const PROJECT_ID: &str = "project_id";

/// Failure while persisting identity data to resource state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("expected organization ID to be a UUID, got {0:?}")]
    InvalidOrganizationId(String),

    #[error("expected project ID to be a UUID, got {0:?}")]
    InvalidProjectId(String),

    #[error("location has no organization ID to persist")]
    MissingOrganizationId,

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Flat string-attribute view of one resource's durable state.
///
/// Implementations return `None` for attributes that are unset or empty;
/// the empty string never leaks out of a store.
pub trait AttributeStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    /// The durable resource identifier (the canonical link URL for
    /// link-addressed resources).
    fn id(&self) -> Option<String>;
    fn set_id(&mut self, id: &str);
    /// Drop the identifier and every attribute, marking the resource gone.
    fn clear(&mut self);
}

/// In-memory [`AttributeStore`], used by import flows and the test harness.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    id: Option<String>,
    attrs: HashMap<String, String>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter for test fixtures.
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }
}

impl AttributeStore for MemoryState {
    fn get(&self, key: &str) -> Option<String> {
        self.attrs
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.attrs.insert(key.to_string(), value.to_string());
    }

    fn id(&self) -> Option<String> {
        self.id.clone().filter(|id| !id.is_empty())
    }

    fn set_id(&mut self, id: &str) {
        self.id = Some(id.to_string());
    }

    fn clear(&mut self) {
        self.id = None;
        self.attrs.clear();
    }
}

/// Persist a location's coordinates into resource state.
///
/// Both IDs must parse as UUIDs; anything else is refused before any write
/// happens, so state never ends up holding half a location.
pub fn set_location_attributes(
    store: &mut dyn AttributeStore,
    location: &Location,
) -> Result<(), StateError> {
    let organization_id = location
        .organization_id
        .as_deref()
        .ok_or(StateError::MissingOrganizationId)?;

    if Uuid::parse_str(organization_id).is_err() {
        return Err(StateError::InvalidOrganizationId(
            organization_id.to_string(),
        ));
    }
    if Uuid::parse_str(&location.project_id).is_err() {
        return Err(StateError::InvalidProjectId(location.project_id.clone()));
    }

    store.set(ORGANIZATION_ID, organization_id);
    store.set(PROJECT_ID, &location.project_id);
    Ok(())
}

/// Location for a resource operation: the resource-level project attribute
/// when set, the default scope's project otherwise. The organization always
/// comes from the default scope.
pub fn resource_location(
    store: &dyn AttributeStore,
    scope: &Scope,
) -> Result<Location, IdentityError> {
    let resource_project = store.get(PROJECT_ID);
    let project_id = resolve_project_id(
        resource_project.as_deref(),
        Some(scope.project_id.as_str()),
    )?;
    Ok(Location::new(scope.organization_id.clone(), project_id))
}

/// Resolve the operation's location and write it back to state in one step.
pub fn sync_location(
    store: &mut dyn AttributeStore,
    scope: &Scope,
) -> Result<Location, StateError> {
    let location = resource_location(store, scope)?;
    set_location_attributes(store, &location)?;
    Ok(location)
}
