//! Declarative infrastructure adapter for the HashiCorp Cloud Platform
//! control plane.
//!
//! The adapter sits between a declarative engine and the HCP APIs. It owns
//! three concerns:
//!
//! - **Identity** ([`identity`]): canonical link URLs, legacy composite
//!   IDs, and the project precedence rules shared by every resource
//! - **Scope** ([`scope`]): one-shot resolution of the default
//!   (organization, project) pair all unpinned resources operate in
//! - **Lifecycle** ([`resource`]): create/read/delete/import glue for the
//!   network resource family, persisting through the [`state`] seam
//!
//! A typical embedding builds an [`hcp::client::HcpClient`] from
//! [`config::Config`], calls [`configure_scope`] once, and then routes
//! engine verbs through [`resource::dispatch`].

pub mod config;
pub mod diag;
pub mod hcp;
pub mod identity;
pub mod resource;
pub mod scope;
pub mod state;

pub use identity::{parse_composite_id, CompositeId, IdentityError, Link, Location};
pub use resource::{dispatch, read_data_source, AdapterError, Operation};
pub use scope::{configure_scope, ConfiguredScope, Scope, ScopeError};
pub use state::{AttributeStore, MemoryState};
