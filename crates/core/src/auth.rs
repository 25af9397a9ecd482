//! Sign-in exchange payloads.

use serde::{Deserialize, Serialize};

use crate::user::UserIdentity;

/// Body of `POST /auth/github`: an external access token to exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubAuthRequest {
    pub access_token: String,
}

/// Session token and identity returned by a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserIdentity,
}
