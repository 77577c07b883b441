//! Resource identity core
//!
//! Pure string-level machinery shared by every resource the adapter
//! manages:
//!
//! - **Links** ([`Link`]): typed references encoded as canonical URLs,
//!   used as durable resource identifiers
//! - **Composite IDs** ([`CompositeId`]): legacy colon-delimited child
//!   resource addresses accepted on import
//! - **Locations** ([`Location`]): the (organization, project) pair with
//!   the resource-over-client project precedence rule
//!
//! Nothing here performs I/O; everything is deterministic and fails with a
//! typed [`IdentityError`].

pub mod composite;
pub mod error;
pub mod link;
pub mod location;

pub use composite::{parse_composite_id, CompositeId};
pub use error::IdentityError;
pub use link::Link;
pub use location::{resolve_project_id, Location};
