//! Location coordinates and project defaulting
//!
//! Every control plane resource lives at an (organization, project)
//! coordinate pair. Resources may pin a project explicitly; otherwise the
//! adapter's default scope supplies one.

use super::error::IdentityError;

/// The (organization, project) pair scoping a resource.
///
/// The organization is absent on locations recovered from a canonical link
/// URL, since the URL never carries it. Callers fill it from client context
/// before the location is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub organization_id: Option<String>,
    pub project_id: String,
}

impl Location {
    /// Location with both coordinates known.
    pub fn new(organization_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            organization_id: Some(organization_id.into()),
            project_id: project_id.into(),
        }
    }

    /// Location scoped to a project only, organization unknown.
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            organization_id: None,
            project_id: project_id.into(),
        }
    }
}

/// Resolve the project an operation applies to.
///
/// A resource-level project always wins over the client-level default.
/// Empty strings count as unset, so state layers that round-trip absent
/// attributes as `""` resolve the same as ones that pass `None`.
pub fn resolve_project_id(
    resource_level: Option<&str>,
    client_level: Option<&str>,
) -> Result<String, IdentityError> {
    if let Some(id) = resource_level.filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }
    if let Some(id) = client_level.filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }
    Err(IdentityError::MissingProjectId)
}
