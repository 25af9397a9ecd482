//! Stub Sentinai backend for black-box tests.
//!
//! Accepts exactly one session token (`SESSION_TOKEN`) and records every
//! request it sees so tests can assert on headers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use uuid::Uuid;

use sentinai_client::{ApiClient, ClientConfig, RecordingNavigator, SessionController, TokenStore};

pub const GOOD_GITHUB_TOKEN: &str = "gh-good";
pub const SESSION_TOKEN: &str = "session-1";

pub const PROJECT_A: Uuid = Uuid::from_u128(0xA);
pub const PROJECT_B: Uuid = Uuid::from_u128(0xB);
pub const USER_ID: Uuid = Uuid::from_u128(0x1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    failing: Arc<Mutex<HashMap<String, String>>>,
    delayed: Arc<Mutex<HashMap<String, Duration>>>,
}

pub struct TestServer {
    pub base_url: String,
    state: StubState,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let state = StubState::default();
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    /// Make `path` answer 500 `{"error": <message>}`.
    pub fn fail_path(&self, path: impl Into<String>, message: &str) {
        self.state
            .failing
            .lock()
            .unwrap()
            .insert(path.into(), message.to_string());
    }

    /// Hold every request to `path` for `delay` before answering.
    pub fn delay_path(&self, path: impl Into<String>, delay: Duration) {
        self.state
            .delayed
            .lock()
            .unwrap()
            .insert(path.into(), delay);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// API client, its credential cell and a recording navigator.
    pub fn client(&self) -> (ApiClient, TokenStore, Arc<RecordingNavigator>) {
        let tokens = TokenStore::new();
        let navigator = Arc::new(RecordingNavigator::new());
        let config = ClientConfig::new(self.base_url.clone()).unwrap();
        let api = ApiClient::new(config, tokens.clone(), navigator.clone());
        (api, tokens, navigator)
    }

    pub fn session(&self) -> (SessionController, TokenStore, Arc<RecordingNavigator>) {
        let (api, tokens, navigator) = self.client();
        (SessionController::new(api), tokens, navigator)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: StubState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/auth/github", post(auth_github))
        .route("/auth/me", get(auth_me))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", get(get_project).delete(delete_project))
        .route("/projects/:id/pipelines", get(list_pipelines))
        .route("/projects/:id/generate-ci", post(generate_ci))
        .route("/projects/:id/security", get(project_findings))
        .route("/security", get(all_findings))
        .route("/broken", get(|| async { (StatusCode::OK, "this is not json") }))
        .route(
            "/plain-error",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream exploded") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({}))
            }),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<StubState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let recorded = {
        let header = |name| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Recorded {
            method: req.method().to_string(),
            path: path.clone(),
            authorization: header(AUTHORIZATION),
            content_type: header(CONTENT_TYPE),
        }
    };
    state.requests.lock().unwrap().push(recorded);

    let forced = state.failing.lock().unwrap().get(&path).cloned();
    if let Some(message) = forced {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": message})),
        )
            .into_response();
    }

    let delay = state.delayed.lock().unwrap().get(&path).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    next.run(req).await
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {SESSION_TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid token"})),
        )
            .into_response()),
    }
}

pub fn user_json() -> Value {
    json!({
        "id": USER_ID,
        "github_id": 42,
        "username": "octocat",
        "email": "octocat@example.com",
        "created_at": "2024-01-01T00:00:00Z"
    })
}

pub fn project_json(id: Uuid, name: &str) -> Value {
    json!({
        "id": id,
        "user_id": USER_ID,
        "name": name,
        "repository_url": format!("https://github.com/octocat/{name}"),
        "created_at": "2024-01-02T00:00:00Z"
    })
}

fn finding_json(id: u128, project: Uuid, severity: &str, resolved: bool, created_at: &str) -> Value {
    json!({
        "id": Uuid::from_u128(id),
        "project_id": project,
        "severity": severity,
        "description": format!("finding {id}"),
        "resolved": resolved,
        "created_at": created_at
    })
}

async fn auth_github(Json(body): Json<Value>) -> Response {
    if body.get("access_token").and_then(Value::as_str) == Some(GOOD_GITHUB_TOKEN) {
        Json(json!({"token": SESSION_TOKEN, "user": user_json()})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid GitHub token"})),
        )
            .into_response()
    }
}

async fn auth_me(headers: HeaderMap) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    Json(user_json()).into_response()
}

async fn list_projects(headers: HeaderMap) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    Json(json!([project_json(PROJECT_A, "alpha"), project_json(PROJECT_B, "beta")])).into_response()
}

async fn create_project(headers: HeaderMap, Json(_body): Json<Value>) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    StatusCode::CREATED.into_response()
}

async fn get_project(headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    Json(project_json(id, "alpha")).into_response()
}

async fn delete_project(headers: HeaderMap, Path(_id): Path<Uuid>) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    Json(()).into_response()
}

async fn list_pipelines(headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    let pipeline = |n: u128, created_at: &str| {
        json!({
            "id": Uuid::from_u128(0x100 + n),
            "project_id": id,
            "yaml_config": format!("name: ci-{n}"),
            "created_at": created_at
        })
    };
    Json(json!([
        pipeline(1, "2024-02-01T00:00:00Z"),
        pipeline(2, "2024-04-01T00:00:00Z"),
        pipeline(3, "2024-03-01T00:00:00Z"),
    ]))
    .into_response()
}

async fn generate_ci(headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    Json(json!({
        "id": Uuid::from_u128(0x200),
        "project_id": id,
        "yaml_config": "name: generated",
        "created_at": "2024-05-01T00:00:00Z"
    }))
    .into_response()
}

/// Project A answers slowly so B's findings arrive first.
async fn project_findings(headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    if id == PROJECT_A {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Json(json!([
            finding_json(0xA1, PROJECT_A, "critical", false, "2024-03-01T00:00:00Z"),
            finding_json(0xA2, PROJECT_A, "low", true, "2024-01-15T00:00:00Z"),
        ]))
        .into_response()
    } else {
        Json(json!([finding_json(
            0xB1,
            id,
            "high",
            false,
            "2024-02-10T00:00:00Z"
        )]))
        .into_response()
    }
}

async fn all_findings(headers: HeaderMap) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }
    Json(json!([
        finding_json(0xA1, PROJECT_A, "critical", false, "2024-03-01T00:00:00Z"),
        finding_json(0xB1, PROJECT_B, "high", false, "2024-02-10T00:00:00Z"),
        finding_json(0xA2, PROJECT_A, "low", true, "2024-01-15T00:00:00Z"),
    ]))
    .into_response()
}
