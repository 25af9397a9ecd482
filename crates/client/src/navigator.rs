//! Navigation side effects.
//!
//! The client never owns a router. Redirects are issued through this trait so
//! embedders decide what "go to sign-in" means.

use std::sync::{Mutex, PoisonError};

/// How a navigation is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Full reload: every piece of in-memory state is discarded.
    Hard,
    /// In-app route change; in-memory state survives.
    Soft,
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, mode: NavigationMode);
}

/// Default navigator: records the intent in the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, path: &str, mode: NavigationMode) {
        tracing::info!(path, ?mode, "navigation requested");
    }
}

/// Navigator that keeps an inspectable history.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<(String, NavigationMode)>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<(String, NavigationMode)> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<(String, NavigationMode)> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, mode: NavigationMode) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_string(), mode));
    }
}
