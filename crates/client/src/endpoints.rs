//! Typed wrappers for every backend endpoint the dashboard consumes.
//!
//! These are thin: they pick the path and the payload type and leave all
//! classification to [`ApiClient`].

use sentinai_core::{
    AuthResponse, GithubAuthRequest, NewProject, Pipeline, Project, ProjectId, SecurityFinding,
    UserIdentity,
};
use serde_json::json;

use crate::api::{ApiClient, ApiResult, decode_payload};

pub const AUTH_GITHUB: &str = "/auth/github";
pub const AUTH_ME: &str = "/auth/me";
pub const PROJECTS: &str = "/projects";
pub const SECURITY: &str = "/security";
pub const HEALTH: &str = "/health";

pub fn project_path(id: ProjectId) -> String {
    format!("{PROJECTS}/{id}")
}

pub fn pipelines_path(id: ProjectId) -> String {
    format!("{PROJECTS}/{id}/pipelines")
}

pub fn generate_ci_path(id: ProjectId) -> String {
    format!("{PROJECTS}/{id}/generate-ci")
}

pub fn project_security_path(id: ProjectId) -> String {
    format!("{PROJECTS}/{id}/security")
}

pub fn security_scan_path(id: ProjectId) -> String {
    format!("{PROJECTS}/{id}/security/scan")
}

impl ApiClient {
    /// Exchange an external GitHub access token for a session token.
    pub async fn authenticate_github(&self, access_token: &str) -> ApiResult<AuthResponse> {
        let body = GithubAuthRequest {
            access_token: access_token.to_string(),
        };
        self.post_json(AUTH_GITHUB, &body).await
    }

    /// Resolve the identity behind the stored credential.
    pub async fn current_user(&self) -> ApiResult<UserIdentity> {
        self.get_json(AUTH_ME).await
    }

    pub async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.get_json(PROJECTS).await
    }

    /// Create a project. Returns the created project when the server sends
    /// one back; an empty success body yields `None`.
    pub async fn create_project(&self, project: &NewProject) -> ApiResult<Option<Project>> {
        project.validate()?;
        self.post(PROJECTS, project)
            .await?
            .map(|value| decode_payload(Some(value)))
            .transpose()
    }

    pub async fn get_project(&self, id: ProjectId) -> ApiResult<Project> {
        self.get_json(&project_path(id)).await
    }

    pub async fn delete_project(&self, id: ProjectId) -> ApiResult<()> {
        self.delete(&project_path(id)).await.map(|_| ())
    }

    pub async fn list_pipelines(&self, id: ProjectId) -> ApiResult<Vec<Pipeline>> {
        self.get_json(&pipelines_path(id)).await
    }

    /// Ask the backend to analyze the repository and generate a CI pipeline.
    pub async fn generate_ci(&self, id: ProjectId) -> ApiResult<Option<Pipeline>> {
        self.post(&generate_ci_path(id), &json!({}))
            .await?
            .map(|value| decode_payload(Some(value)))
            .transpose()
    }

    /// Findings across every project the user owns.
    pub async fn list_findings(&self) -> ApiResult<Vec<SecurityFinding>> {
        self.get_json(SECURITY).await
    }

    pub async fn list_project_findings(&self, id: ProjectId) -> ApiResult<Vec<SecurityFinding>> {
        self.get_json(&project_security_path(id)).await
    }

    /// Run a fresh scan; returns the findings it produced.
    pub async fn run_security_scan(&self, id: ProjectId) -> ApiResult<Vec<SecurityFinding>> {
        self.post_json(&security_scan_path(id), &json!({})).await
    }

    /// Reachability probe. Never raises; any failure reads as unreachable.
    pub async fn health(&self) -> bool {
        match self.get(HEALTH).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "health probe failed");
                false
            }
        }
    }
}
