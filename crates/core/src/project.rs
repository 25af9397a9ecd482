//! Projects: repositories registered for CI generation and scanning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{ProjectId, UserId};
use crate::ordering::Timestamped;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub repository_url: String,
    pub created_at: DateTime<Utc>,
}

impl Timestamped for Project {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub repository_url: String,
}

impl NewProject {
    pub fn new(name: impl Into<String>, repository_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository_url: repository_url.into(),
        }
    }

    /// Reject blank fields before a request is issued.
    ///
    /// The backend remains the authority on what a valid repository is.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("project name must not be blank"));
        }
        if self.repository_url.trim().is_empty() {
            return Err(DomainError::validation("repository url must not be blank"));
        }
        Ok(())
    }
}
