//! HTTP boundary: credential injection and outcome classification.
//!
//! Every call reads the current credential from the [`TokenStore`], issues
//! exactly one request to `<base url><path>`, and maps the result into either
//! a decoded JSON value or a typed [`ApiError`]. There are no retries and no
//! response cache.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sentinai_core::DomainError;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::navigator::{NavigationMode, Navigator};
use crate::token_store::TokenStore;

/// Result type returned by every API call.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message used when the server rejects the credential.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Message used when an error body is JSON but carries no `error` field.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Classified failure of a single API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, refused, reset).
    #[error("network error: {0}")]
    Transport(String),
    /// Status 401. The session has already been torn down when this is seen.
    #[error("Unauthorized")]
    Unauthorized,
    /// Any other non-2xx status, with the server's message.
    #[error("{message}")]
    Request { status: u16, message: String },
    /// A 2xx response whose body is not the expected JSON.
    #[error("malformed response body: {0}")]
    Decode(String),
    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(String),
    /// Rejected client-side before any request was issued.
    #[error(transparent)]
    Invalid(#[from] DomainError),
    /// The caller's cancellation token fired before the call completed.
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status of the failure, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED.as_u16()),
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// User-displayable message.
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            ApiError::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Notified synchronously on the 401 path, after the credential is cleared.
pub(crate) trait InvalidationListener: Send + Sync {
    fn session_invalidated(&self);
}

/// Client for the Sentinai REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, the credential
/// cell and the invalidation listeners.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    listeners: Arc<RwLock<Vec<Weak<dyn InvalidationListener>>>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, tokens: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            tokens,
            navigator,
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub(crate) fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Register a listener for credential rejection (status 401).
    ///
    /// Only a weak reference is kept; listeners whose owner is gone are
    /// pruned here and on every 401.
    pub(crate) fn on_unauthorized(&self, listener: Weak<dyn InvalidationListener>) {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|l| l.strong_count() > 0);
        listeners.push(listener);
    }

    /// `GET <path>`. `Ok(None)` means a successful response with an empty body.
    pub async fn get(&self, path: &str) -> ApiResult<Option<Value>> {
        self.send(Method::GET, path, None).await
    }

    /// `POST <path>` with a JSON body.
    pub async fn post<B>(&self, path: &str, body: &B) -> ApiResult<Option<Value>>
    where
        B: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.send(Method::POST, path, Some(bytes)).await
    }

    /// `DELETE <path>`.
    pub async fn delete(&self, path: &str) -> ApiResult<Option<Value>> {
        self.send(Method::DELETE, path, None).await
    }

    /// `GET <path>` decoded into `T`; an empty body is a decode failure.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        decode_payload(self.get(path).await?)
    }

    /// `POST <path>` decoded into `T`; an empty body is a decode failure.
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        decode_payload(self.post(path, body).await?)
    }

    /// `GET <path>` that resolves to [`ApiError::Cancelled`] once `cancel` fires.
    pub async fn get_cancellable(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> ApiResult<Option<Value>> {
        with_cancel(cancel, self.get(path)).await
    }

    /// `POST <path>` that resolves to [`ApiError::Cancelled`] once `cancel` fires.
    pub async fn post_cancellable<B>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> ApiResult<Option<Value>>
    where
        B: Serialize + ?Sized,
    {
        with_cancel(cancel, self.post(path, body)).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> ApiResult<Option<Value>> {
        let credential = self.tokens.get();

        let mut req = self
            .http
            .request(method.clone(), self.config.endpoint(path))
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = &credential {
            req = req.bearer_auth(token);
        }
        if let Some(bytes) = body {
            req = req.body(bytes);
        }

        tracing::debug!(%method, path, authenticated = credential.is_some(), "api request");

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "api transport failure");
            ApiError::Transport(e.to_string())
        })?;

        self.classify(&method, path, resp).await
    }

    async fn classify(
        &self,
        method: &Method,
        path: &str,
        resp: reqwest::Response,
    ) -> ApiResult<Option<Value>> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, path, "credential rejected; tearing down session");
            self.invalidate_session();
            return Err(ApiError::Unauthorized);
        }

        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&text);
            tracing::warn!(%method, path, status = status.as_u16(), %message, "api request failed");
            return Err(ApiError::Request {
                status: status.as_u16(),
                message,
            });
        }

        if text.is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text).map(Some).map_err(|e| {
            tracing::warn!(%method, path, error = %e, "malformed success payload");
            ApiError::Decode(e.to_string())
        })
    }

    /// Clear the credential, tell listeners, then force a hard reload to sign-in.
    fn invalidate_session(&self) {
        self.tokens.clear();

        let live: Vec<Arc<dyn InvalidationListener>> = {
            let mut listeners = self
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener.session_invalidated();
        }

        self.navigator
            .navigate(self.config.sign_in_path(), NavigationMode::Hard);
    }
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.config.api_url())
            .field("tokens", &self.tokens)
            .finish()
    }
}

/// Extract the server's message from an error body.
///
/// `{"error": "..."}` yields the field; JSON without it yields a generic
/// message; anything that is not JSON is returned verbatim.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_string(),
        Err(_) => body.to_string(),
    }
}

/// Turn an optional payload into a concrete type.
pub fn decode_payload<T: DeserializeOwned>(payload: Option<Value>) -> ApiResult<T> {
    let value = payload.ok_or_else(|| {
        ApiError::Decode("expected a JSON payload but the response body was empty".to_string())
    })?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) async fn with_cancel<F, T>(cancel: &CancellationToken, fut: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(ApiError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}
