//! Projects
//!
//! Functions for fetching and listing projects, plus the oldest-project
//! selection used when credentials have to pick a default.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::client::HcpClient;
use super::http::{decode, ApiError};
use super::Pagination;

/// A project in the control plane resource hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub parent: ResourceRef,
}

/// Parent pointer on hierarchy objects.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct GetProjectResponse {
    project: Project,
}

#[derive(Debug, Deserialize)]
struct ListProjectsResponse {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// Fetch a single project by ID.
pub async fn get_project(client: &HcpClient, project_id: &str) -> Result<Project, ApiError> {
    let url = client.resource_manager_url(&format!(
        "projects/{}",
        urlencoding::encode(project_id)
    ));
    let response = client.get(&url).await?;
    let parsed: GetProjectResponse = decode(&url, response)?;
    Ok(parsed.project)
}

/// List all projects under an organization (auto-paginate).
pub async fn list_projects(
    client: &HcpClient,
    organization_id: &str,
) -> Result<Vec<Project>, ApiError> {
    let mut all = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut url = format!(
            "{}?scope.type=ORGANIZATION&scope.id={}",
            client.resource_manager_url("projects"),
            urlencoding::encode(organization_id)
        );
        if let Some(token) = page_token.as_deref() {
            url = format!("{url}&pagination.next_page_token={}", urlencoding::encode(token));
        }

        let response = client.get(&url).await?;
        let page: ListProjectsResponse = decode(&url, response)?;
        all.extend(page.projects);

        page_token = page.pagination.and_then(Pagination::into_next_token);
        if page_token.is_none() {
            break;
        }
    }

    tracing::debug!("Listed {} projects", all.len());
    Ok(all)
}

/// The earliest-created project in the slice, or `None` when it is empty.
///
/// A single pass tracking the strict minimum: later entries with an equal
/// `created_at` never displace the first one seen, so the choice is stable
/// for a fixed listing order.
pub fn select_oldest(projects: &[Project]) -> Option<&Project> {
    let mut oldest: Option<&Project> = None;
    for project in projects {
        match oldest {
            Some(current) if project.created_at >= current.created_at => {}
            _ => oldest = Some(project),
        }
    }
    oldest
}
