//! Legacy composite resource IDs
//!
//! Child resources of an HVN were historically addressed by colon-delimited
//! IDs, `{hvn_id}:{id}`, optionally prefixed with a project:
//! `{project_id}:{hvn_id}:{id}`. Both forms survive in import commands and
//! persisted state, so the adapter still parses them. Anything else is
//! rejected outright.

use super::error::IdentityError;
use super::location::resolve_project_id;

/// Accepted shapes, quoted in malformed-ID errors.
const SHORT_SHAPE: &str = "{hvn_id}:{id}";
const FULL_SHAPE: &str = "{project_id}:{hvn_id}:{id}";

/// A decoded composite ID, tagged by which accepted form the raw string used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeId {
    /// `{project_id}:{hvn_id}:{id}` - the project is carried explicitly.
    Full {
        project_id: String,
        hvn_id: String,
        id: String,
    },
    /// `{hvn_id}:{id}` - the project is left to client-level defaulting.
    Short { hvn_id: String, id: String },
}

impl CompositeId {
    /// Decode a raw composite ID without resolving the project.
    ///
    /// Exactly two or three non-empty colon-delimited segments are
    /// accepted; any other count, and any empty segment, is malformed.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let malformed = |expected: &str| IdentityError::MalformedId {
            id: raw.to_string(),
            expected: expected.to_string(),
        };

        let parts: Vec<&str> = raw.split(':').collect();
        match parts.as_slice() {
            [project_id, hvn_id, id] => {
                if project_id.is_empty() || hvn_id.is_empty() || id.is_empty() {
                    return Err(malformed(FULL_SHAPE));
                }
                Ok(CompositeId::Full {
                    project_id: project_id.to_string(),
                    hvn_id: hvn_id.to_string(),
                    id: id.to_string(),
                })
            }
            [hvn_id, id] => {
                if hvn_id.is_empty() || id.is_empty() {
                    return Err(malformed(SHORT_SHAPE));
                }
                Ok(CompositeId::Short {
                    hvn_id: hvn_id.to_string(),
                    id: id.to_string(),
                })
            }
            _ => Err(malformed(&format!("{SHORT_SHAPE} or {FULL_SHAPE}"))),
        }
    }
}

/// Decode a composite ID and resolve the project it applies to.
///
/// Three-segment IDs carry their project verbatim; two-segment IDs fall
/// back to the client-level default. Returns `(project_id, hvn_id, id)`.
pub fn parse_composite_id(
    raw: &str,
    client_project_id: Option<&str>,
) -> Result<(String, String, String), IdentityError> {
    match CompositeId::parse(raw)? {
        CompositeId::Full {
            project_id,
            hvn_id,
            id,
        } => Ok((project_id, hvn_id, id)),
        CompositeId::Short { hvn_id, id } => {
            let project_id = resolve_project_id(None, client_project_id)?;
            Ok((project_id, hvn_id, id))
        }
    }
}
