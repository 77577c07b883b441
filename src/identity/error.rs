//! Error kinds for the identity core
//!
//! Every failure mode of link encoding, link decoding, composite ID
//! parsing, and project resolution is a distinct variant so callers can
//! branch on what went wrong instead of matching message text.

use thiserror::Error;

/// Failure while encoding, decoding, or resolving a resource identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// No project was supplied at either the resource or the client level.
    #[error("project ID not defined; set it in the provider configuration or in the resource configuration")]
    MissingProjectId,

    /// A link is missing a field required to build its canonical URL.
    #[error("invalid link: {0}")]
    InvalidLink(String),

    /// A canonical URL failed strict structural validation.
    #[error("invalid link URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The type embedded in a URL is not the type the caller expected.
    #[error("link URL carries type {found:?}, expected {expected:?}")]
    TypeMismatch { expected: String, found: String },

    /// A composite ID does not match any accepted colon-delimited shape.
    #[error("unexpected format of ID {id:?}, expected {expected}")]
    MalformedId { id: String, expected: String },
}
