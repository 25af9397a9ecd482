//! Authenticated user identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::ordering::Timestamped;

/// The identity the backend associates with a session token.
///
/// `github_id` is the external account the user signed in with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub github_id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Timestamped for UserIdentity {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
