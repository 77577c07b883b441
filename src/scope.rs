//! Default scope resolution
//!
//! Runs once at adapter start: establish which organization and project
//! anchor every operation that does not pin its own project. With a
//! configured project the answer is fetched directly; otherwise it is
//! derived from what the credentials can see.

use thiserror::Error;
use uuid::Uuid;

use crate::diag::{Diagnostic, Diagnostics};
use crate::hcp::client::HcpClient;
use crate::hcp::http::ApiError;
use crate::hcp::organizations::list_organizations;
use crate::hcp::projects::{get_project, list_projects, select_oldest};

/// The adapter's resolved default coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub organization_id: String,
    pub project_id: String,
}

/// Outcome of scope configuration: the frozen scope plus any warnings
/// raised while resolving it.
#[derive(Debug)]
pub struct ConfiguredScope {
    pub scope: Scope,
    pub warnings: Diagnostics,
}

/// Fatal failure while resolving or freezing the default scope.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("configured project ID {0:?} is not a UUID")]
    InvalidConfiguredProject(String),

    #[error("unable to fetch project {id:?}: {source}")]
    ProjectLookup {
        id: String,
        #[source]
        source: ApiError,
    },

    #[error("unexpected number of organizations: expected 1, got {count}")]
    AmbiguousOrganization { count: usize },

    #[error("organization {organization_id} contains no projects; create one or set a project ID in the provider configuration")]
    EmptyOrganization { organization_id: String },

    #[error("adapter scope is already configured")]
    AlreadyConfigured,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Resolve the default scope and freeze it on the client.
///
/// One-shot: a second call fails with [`ScopeError::AlreadyConfigured`]
/// without touching the network. A failed attempt leaves the client
/// unconfigured.
pub async fn configure_scope(client: &HcpClient) -> Result<ConfiguredScope, ScopeError> {
    if client.scope().is_some() {
        return Err(ScopeError::AlreadyConfigured);
    }

    let mut warnings = Diagnostics::new();
    let scope = match client.configured_project_id() {
        Some(project_id) => scope_from_project(client, project_id).await?,
        None => scope_from_credentials(client, &mut warnings).await?,
    };

    client
        .freeze_scope(scope.clone())
        .map_err(|_| ScopeError::AlreadyConfigured)?;

    tracing::info!(
        organization_id = %scope.organization_id,
        project_id = %scope.project_id,
        "default scope configured"
    );
    Ok(ConfiguredScope { scope, warnings })
}

/// Explicit path: the operator named a project, so fetch it and take both
/// coordinates from the returned record.
async fn scope_from_project(client: &HcpClient, project_id: &str) -> Result<Scope, ScopeError> {
    if Uuid::parse_str(project_id).is_err() {
        return Err(ScopeError::InvalidConfiguredProject(project_id.to_string()));
    }

    let project = get_project(client, project_id)
        .await
        .map_err(|source| ScopeError::ProjectLookup {
            id: project_id.to_string(),
            source,
        })?;

    Ok(Scope {
        organization_id: project.parent.id,
        project_id: project.id,
    })
}

/// Credential path: derive the scope from what the credentials can see.
/// Requires exactly one visible organization; with several projects the
/// oldest wins and a warning tells the operator how to pin one explicitly.
async fn scope_from_credentials(
    client: &HcpClient,
    warnings: &mut Diagnostics,
) -> Result<Scope, ScopeError> {
    let organizations = list_organizations(client).await?;
    if organizations.len() != 1 {
        return Err(ScopeError::AmbiguousOrganization {
            count: organizations.len(),
        });
    }
    let organization_id = organizations
        .into_iter()
        .next()
        .map(|organization| organization.id)
        .ok_or(ScopeError::AmbiguousOrganization { count: 0 })?;

    let projects = list_projects(client, &organization_id).await?;
    let oldest = select_oldest(&projects).ok_or_else(|| ScopeError::EmptyOrganization {
        organization_id: organization_id.clone(),
    })?;

    if projects.len() > 1 {
        tracing::warn!(
            "Credentials can see {} projects, defaulting to the oldest",
            projects.len()
        );
        warnings.push(Diagnostic::warning(
            "There is more than one project associated with the configured credentials.",
            format!(
                "The oldest project {:?} was selected as the default. To use a different \
                 project, set a project ID in the provider configuration; resources may \
                 also set their own.",
                oldest.id
            ),
        ));
    }

    Ok(Scope {
        organization_id,
        project_id: oldest.id.clone(),
    })
}
