//! Security findings reported by repository scans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{FindingId, ProjectId};
use crate::ordering::Timestamped;

/// Finding severity.
///
/// The backend sends a free-form string; anything outside the known scale is
/// kept verbatim in `Unknown` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    Unknown(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Unknown(s) => s,
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Unknown(value),
        }
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub id: FindingId,
    pub project_id: ProjectId,
    pub severity: Severity,
    pub description: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

impl SecurityFinding {
    /// Unresolved critical findings are the ones that need action first.
    pub fn is_blocking(&self) -> bool {
        !self.resolved && self.severity == Severity::Critical
    }
}

impl Timestamped for SecurityFinding {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
