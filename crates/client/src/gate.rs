//! Access gate for protected views.

use sentinai_core::UserIdentity;

use crate::navigator::NavigationMode;
use crate::session::{SessionController, SessionState};

/// What a gated view resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView<V> {
    /// Session not resolved yet; show a neutral placeholder.
    Waiting,
    /// Anonymous; a redirect to sign-in has been issued.
    Redirected,
    /// Authenticated; the protected view.
    Render(V),
}

impl<V> GateView<V> {
    pub fn into_rendered(self) -> Option<V> {
        match self {
            GateView::Render(v) => Some(v),
            _ => None,
        }
    }
}

/// Wraps protected views and keeps them from rendering for anonymous users.
#[derive(Debug, Clone)]
pub struct AccessGate {
    session: SessionController,
}

impl AccessGate {
    pub fn new(session: SessionController) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Render against the current session state without waiting.
    ///
    /// `view` is only invoked when the session is authenticated, so nothing
    /// protected is produced while resolution is pending.
    pub fn render<V, F>(&self, view: F) -> GateView<V>
    where
        F: FnOnce(&UserIdentity) -> V,
    {
        match self.session.state() {
            SessionState::Authenticated(user) => GateView::Render(view(&user)),
            SessionState::Anonymous => {
                let sign_in = self.session.api().config().sign_in_path().to_string();
                tracing::debug!(path = %sign_in, "gate redirecting anonymous session");
                self.session
                    .api()
                    .navigator()
                    .navigate(&sign_in, NavigationMode::Soft);
                GateView::Redirected
            }
            SessionState::Unresolved | SessionState::Resolving => GateView::Waiting,
        }
    }

    /// Resolve the session first, then render.
    ///
    /// Never yields [`GateView::Waiting`].
    pub async fn guard<V, F>(&self, view: F) -> GateView<V>
    where
        F: FnOnce(&UserIdentity) -> V,
    {
        self.session.mount().await;
        self.session.resolved().await;
        self.render(view)
    }
}
