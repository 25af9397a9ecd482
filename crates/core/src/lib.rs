//! `sentinai-core` — value objects exchanged with the Sentinai backend.
//!
//! These are **pass-through** types: identity and timestamps are assigned by
//! the server, and the client never mutates them beyond routing requests.

pub mod auth;
pub mod error;
pub mod id;
pub mod ordering;
pub mod pipeline;
pub mod project;
pub mod security;
pub mod user;

pub use auth::{AuthResponse, GithubAuthRequest};
pub use error::{DomainError, DomainResult};
pub use id::{FindingId, PipelineId, ProjectId, UserId};
pub use ordering::{Timestamped, sort_newest_first};
pub use pipeline::Pipeline;
pub use project::{NewProject, Project};
pub use security::{SecurityFinding, Severity};
pub use user::UserIdentity;
