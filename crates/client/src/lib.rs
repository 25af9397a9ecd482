//! `sentinai-client`
//!
//! **Responsibility:** session lifecycle and the API boundary for the
//! Sentinai dashboard.
//!
//! This crate provides:
//! - An in-memory credential cell (never persisted)
//! - An API client that injects the credential and classifies outcomes
//! - A session controller that resolves, holds and tears down the session
//! - An access gate for protected views
//!
//! Views are collaborators: they read the session and call the API client,
//! and never touch the credential directly.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod endpoints;
pub mod gate;
pub mod navigator;
pub mod session;
pub mod token_store;

pub use api::{ApiClient, ApiError, ApiResult};
pub use config::{ClientConfig, ConfigError};
pub use gate::{AccessGate, GateView};
pub use navigator::{LoggingNavigator, NavigationMode, Navigator, RecordingNavigator};
pub use session::{SessionController, SessionState, SessionSubscription};
pub use token_store::TokenStore;
pub use tokio_util::sync::CancellationToken;
