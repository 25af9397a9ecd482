//! Generated CI pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{PipelineId, ProjectId};
use crate::ordering::Timestamped;

/// A CI configuration generated for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub project_id: ProjectId,
    pub yaml_config: String,
    pub created_at: DateTime<Utc>,
}

impl Timestamped for Pipeline {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
