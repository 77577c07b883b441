//! Canonical resource links
//!
//! A link is a fully qualified reference to one control plane resource:
//! its namespaced type, its identifier, and the location scoping it.
//! Links print to and parse from the canonical URL form
//! `/project/{project_id}/{type}/{id}`, which is also what resources store
//! as their durable identifier.

use super::error::IdentityError;
use super::location::Location;

/// Leading keyword of every canonical link URL.
const PROJECT_SEGMENT: &str = "project";

/// A fully qualified, typed reference to a single control plane resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Namespaced resource type, e.g. `hashicorp.network.hvn`.
    pub resource_type: String,
    /// Identifier, unique within the project for this type.
    pub id: String,
    /// Coordinates scoping the resource.
    pub location: Location,
}

impl Link {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            location,
        }
    }

    /// Canonical URL form of this link: `/project/{project_id}/{type}/{id}`.
    ///
    /// The organization is deliberately not encoded; it travels out of band
    /// in client context. Segment values are substituted verbatim. They are
    /// URL-safe by construction upstream, and a value embedding `/` yields a
    /// URL that [`Link::from_url`] rejects rather than misreads.
    pub fn canonical_url(&self) -> Result<String, IdentityError> {
        if self.location.project_id.is_empty() {
            return Err(IdentityError::InvalidLink(
                "location has no project ID".to_string(),
            ));
        }
        if self.resource_type.is_empty() {
            return Err(IdentityError::InvalidLink(
                "resource type is empty".to_string(),
            ));
        }
        if self.id.is_empty() {
            return Err(IdentityError::InvalidLink("resource ID is empty".to_string()));
        }
        Ok(format!(
            "/{}/{}/{}/{}",
            PROJECT_SEGMENT, self.location.project_id, self.resource_type, self.id
        ))
    }

    /// Parse a canonical URL, recovering the link it encodes.
    ///
    /// Validation is strict: exactly four segments, the literal `project`
    /// keyword first, no empty segments anywhere. When `expected_type` is
    /// given and non-empty, the URL's type segment must equal it exactly;
    /// when absent, the type is taken from the URL. The returned location
    /// never carries an organization.
    pub fn from_url(url: &str, expected_type: Option<&str>) -> Result<Self, IdentityError> {
        let invalid = |reason: &str| IdentityError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        // A well formed URL splits into one empty leading segment plus
        // exactly four parts.
        let segments: Vec<&str> = url.split('/').collect();
        if segments.len() != 5 || !segments[0].is_empty() {
            return Err(invalid("expected /project/{project_id}/{type}/{id}"));
        }
        if segments[1] != PROJECT_SEGMENT {
            return Err(invalid("first segment must be \"project\""));
        }

        let project_id = segments[2];
        if project_id.is_empty() {
            return Err(invalid("project ID segment is empty"));
        }
        let url_type = segments[3];
        let id = segments[4];
        if id.is_empty() {
            return Err(invalid("resource ID segment is empty"));
        }

        let resource_type = match expected_type.filter(|t| !t.is_empty()) {
            Some(expected) => {
                if url_type != expected {
                    return Err(IdentityError::TypeMismatch {
                        expected: expected.to_string(),
                        found: url_type.to_string(),
                    });
                }
                url_type
            }
            None => {
                if url_type.is_empty() {
                    return Err(invalid("type segment is empty and no expected type was given"));
                }
                url_type
            }
        };

        Ok(Link {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            location: Location::for_project(project_id),
        })
    }
}
