//! Aggregated reads backing the dashboard, project and security views.
//!
//! Fan-out requests run concurrently and complete in any order; every merged
//! list is sorted newest first before it is returned.

use futures_util::future::join_all;
use sentinai_core::{Pipeline, Project, ProjectId, SecurityFinding, sort_newest_first};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, ApiError, ApiResult, with_cancel};

/// Findings across all projects, with the projects they belong to.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityOverview {
    pub projects: Vec<Project>,
    pub findings: Vec<SecurityFinding>,
    /// Projects whose findings could not be loaded.
    pub failed_projects: Vec<ProjectId>,
}

impl SecurityOverview {
    pub fn project_name(&self, finding: &SecurityFinding) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.id == finding.project_id)
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub pipelines: Vec<Pipeline>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub projects: usize,
    pub findings: usize,
    pub unresolved: usize,
    /// Unresolved critical findings.
    pub blocking: usize,
}

impl DashboardSummary {
    pub fn from_parts(projects: &[Project], findings: &[SecurityFinding]) -> Self {
        Self {
            projects: projects.len(),
            findings: findings.len(),
            unresolved: findings.iter().filter(|f| !f.resolved).count(),
            blocking: findings.iter().filter(|f| f.is_blocking()).count(),
        }
    }
}

/// Load every project, then fetch each project's findings concurrently.
///
/// A failure on the project list fails the whole call. A failure on one
/// project's findings is logged and that project is skipped, except for a
/// rejected credential, which ends the aggregation.
pub async fn security_overview(
    api: &ApiClient,
    cancel: &CancellationToken,
) -> ApiResult<SecurityOverview> {
    let projects = with_cancel(cancel, api.list_projects()).await?;

    let fetches = projects.iter().map(|project| {
        let id = project.id;
        async move { (id, with_cancel(cancel, api.list_project_findings(id)).await) }
    });
    let results = join_all(fetches).await;

    let mut findings = Vec::new();
    let mut failed_projects = Vec::new();
    for (id, result) in results {
        match result {
            Ok(mut batch) => findings.append(&mut batch),
            Err(e @ (ApiError::Unauthorized | ApiError::Cancelled)) => return Err(e),
            Err(e) => {
                tracing::warn!(project_id = %id, error = %e, "failed to load project findings");
                failed_projects.push(id);
            }
        }
    }

    sort_newest_first(&mut findings);

    Ok(SecurityOverview {
        projects,
        findings,
        failed_projects,
    })
}

/// A project together with its pipelines (newest first). Both must load.
pub async fn project_detail(api: &ApiClient, id: ProjectId) -> ApiResult<ProjectDetail> {
    let (project, mut pipelines) = tokio::try_join!(api.get_project(id), api.list_pipelines(id))?;
    sort_newest_first(&mut pipelines);
    Ok(ProjectDetail { project, pipelines })
}

/// Headline counts for the dashboard view.
pub async fn dashboard_summary(api: &ApiClient) -> ApiResult<DashboardSummary> {
    let (projects, findings) = tokio::try_join!(api.list_projects(), api.list_findings())?;
    Ok(DashboardSummary::from_parts(&projects, &findings))
}
