//! Session lifecycle: the single source of truth for "who is signed in".
//!
//! State machine:
//!
//! ```text
//! Unresolved ──mount, credential──▶ Resolving ──/auth/me ok──▶ Authenticated(user)
//!      │                                 └──────failure───────▶ Anonymous
//!      └──────mount, no credential────────────────────────────▶ Anonymous
//!
//! login(token, user) ─▶ Authenticated(user)   (from any state)
//! logout() / any 401  ─▶ Anonymous            (from any state)
//! ```
//!
//! `Authenticated` means "the credential was valid as of the last check", not
//! a live guarantee. A later 401 on any call moves the session to `Anonymous`
//! through the API client's invalidation listener.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use sentinai_core::UserIdentity;
use tokio::sync::Notify;

use crate::api::{ApiClient, ApiResult, InvalidationListener};
use crate::navigator::NavigationMode;
use crate::token_store::TokenStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been checked yet.
    Unresolved,
    /// Startup resolution of a stored credential is in flight.
    Resolving,
    Authenticated(UserIdentity),
    Anonymous,
}

impl SessionState {
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// `true` once the session is known to be authenticated or anonymous.
    pub fn is_resolved(&self) -> bool {
        matches!(self, SessionState::Authenticated(_) | SessionState::Anonymous)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionState::Unresolved => "unresolved",
            SessionState::Resolving => "resolving",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Anonymous => "anonymous",
        }
    }
}

/// A subscription to session transitions.
///
/// Every transition is delivered in the order it happened. Dropping the
/// subscription unregisters it on the next transition.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: Receiver<SessionState>,
}

impl SessionSubscription {
    /// Block until the next transition.
    pub fn recv(&self) -> Result<SessionState, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a transition without blocking.
    pub fn try_recv(&self) -> Result<SessionState, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a transition.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<SessionState, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything received so far.
    pub fn drain(&self) -> Vec<SessionState> {
        self.receiver.try_iter().collect()
    }
}

/// Current state plus a counter bumped by every externally driven transition
/// (login, logout, 401). Startup resolution only commits if the counter did
/// not move while it was in flight.
#[derive(Debug)]
struct Slot {
    state: SessionState,
    epoch: u64,
}

/// What a transition does to the stored credential.
#[derive(Debug)]
enum Credential {
    Keep,
    Set(String),
    Clear,
}

#[derive(Debug)]
struct Shared {
    slot: RwLock<Slot>,
    tokens: TokenStore,
    mounted: AtomicBool,
    signing_in: AtomicUsize,
    subscribers: Mutex<Vec<Sender<SessionState>>>,
    changed: Notify,
}

impl Shared {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `next`, bumping the epoch. Returns whether the state changed.
    fn commit(&self, next: SessionState, credential: Credential) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.epoch += 1;
        self.apply(&mut slot, next, credential)
    }

    /// Move to `next` only if no external transition happened since `epoch`.
    fn commit_if_current(&self, epoch: u64, next: SessionState, credential: Credential) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.epoch != epoch {
            tracing::debug!(to = next.kind(), "discarding stale session resolution");
            return false;
        }
        self.apply(&mut slot, next, credential)
    }

    /// The credential is written under the slot lock so state and credential
    /// never disagree to a concurrent reader of the session.
    fn apply(&self, slot: &mut Slot, next: SessionState, credential: Credential) -> bool {
        match credential {
            Credential::Keep => {}
            Credential::Set(token) => self.tokens.set(Some(token)),
            Credential::Clear => self.tokens.clear(),
        }

        if slot.state == next {
            return false;
        }
        tracing::info!(from = slot.state.kind(), to = next.kind(), "session transition");
        slot.state = next.clone();

        // Publish while the slot is still locked so subscribers see
        // transitions in commit order.
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subs.retain(|tx| tx.send(next.clone()).is_ok());
        drop(subs);

        self.changed.notify_waiters();
        true
    }
}

impl InvalidationListener for Shared {
    fn session_invalidated(&self) {
        self.commit(SessionState::Anonymous, Credential::Clear);
    }
}

/// Owns the authenticated-user value.
///
/// Collaborators read [`user`](Self::user) / [`loading`](Self::loading) and
/// call [`login`](Self::login) / [`logout`](Self::logout); they never touch
/// the credential directly. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionController {
    api: ApiClient,
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(api: ApiClient) -> Self {
        let shared = Arc::new(Shared {
            slot: RwLock::new(Slot {
                state: SessionState::Unresolved,
                epoch: 0,
            }),
            tokens: api.tokens().clone(),
            mounted: AtomicBool::new(false),
            signing_in: AtomicUsize::new(0),
            subscribers: Mutex::new(Vec::new()),
            changed: Notify::new(),
        });

        let listener: Arc<dyn InvalidationListener> = shared.clone();
        api.on_unauthorized(Arc::downgrade(&listener));

        Self { api, shared }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.shared.read().state.clone()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.shared.read().state.user().cloned()
    }

    /// `true` while startup resolution or a sign-in is in flight.
    ///
    /// An unmounted controller is not loading; use [`state`](Self::state) to
    /// tell "not checked yet" apart from "anonymous".
    pub fn loading(&self) -> bool {
        let resolving = self.shared.read().state == SessionState::Resolving;
        resolving || self.shared.signing_in.load(Ordering::SeqCst) > 0
    }

    pub fn subscribe(&self) -> SessionSubscription {
        let (tx, rx) = mpsc::channel();
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        SessionSubscription { receiver: rx }
    }

    /// Resolve the session from the stored credential.
    ///
    /// Runs at most once per controller; later calls return the current
    /// state without issuing a request. A failed resolution never surfaces
    /// as an error: the stale credential is dropped and the session becomes
    /// anonymous.
    pub async fn mount(&self) -> SessionState {
        if self.shared.mounted.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        let epoch = {
            let slot = self.shared.read();
            if slot.state != SessionState::Unresolved {
                // A login already decided the session.
                return slot.state.clone();
            }
            slot.epoch
        };

        if !self.api.tokens().is_present() {
            self.shared
                .commit_if_current(epoch, SessionState::Anonymous, Credential::Keep);
            return self.state();
        }

        self.shared
            .commit_if_current(epoch, SessionState::Resolving, Credential::Keep);

        match self.api.current_user().await {
            Ok(user) => {
                self.shared.commit_if_current(
                    epoch,
                    SessionState::Authenticated(user),
                    Credential::Keep,
                );
            }
            Err(e) => {
                tracing::info!(error = %e, "stored credential could not be resolved");
                if self
                    .shared
                    .commit_if_current(epoch, SessionState::Anonymous, Credential::Clear)
                {
                    self.redirect_to_sign_in();
                }
            }
        }

        self.state()
    }

    /// Wait until the session is resolved (authenticated or anonymous).
    ///
    /// Does not trigger resolution by itself; pair with [`mount`](Self::mount).
    pub async fn resolved(&self) -> SessionState {
        loop {
            let changed = self.shared.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            let state = self.state();
            if state.is_resolved() {
                return state;
            }
            changed.await;
        }
    }

    /// Install a credential and identity supplied by the caller.
    ///
    /// The identity is trusted as-is; `/auth/me` is not re-queried.
    pub fn login(&self, token: impl Into<String>, user: UserIdentity) {
        self.shared.commit(
            SessionState::Authenticated(user),
            Credential::Set(token.into()),
        );
    }

    /// Exchange a GitHub access token for a session and sign in with it.
    ///
    /// A rejected GitHub token comes back as a 401, so it tears the session
    /// down like any other 401: credential cleared, state `Anonymous`, hard
    /// navigation to sign-in. Any other failure leaves the previous state
    /// untouched. Either way the error is returned for display. On success
    /// the client moves to the post-login view.
    pub async fn sign_in_with_github(&self, access_token: &str) -> ApiResult<UserIdentity> {
        let _in_flight = SignInGuard::enter(&self.shared);

        let response = self.api.authenticate_github(access_token).await?;
        let user = response.user.clone();
        self.login(response.token, response.user);

        self.api.navigator().navigate(
            self.api.config().after_login_path(),
            NavigationMode::Soft,
        );
        Ok(user)
    }

    /// Drop the session and the credential, then reload to sign-in.
    pub fn logout(&self) {
        self.shared
            .commit(SessionState::Anonymous, Credential::Clear);
        self.redirect_to_sign_in();
    }

    fn redirect_to_sign_in(&self) {
        self.api
            .navigator()
            .navigate(self.api.config().sign_in_path(), NavigationMode::Hard);
    }
}

impl core::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state().kind())
            .field("loading", &self.loading())
            .finish()
    }
}

/// Marks a sign-in as in flight for as long as it is alive.
struct SignInGuard<'a> {
    shared: &'a Shared,
}

impl<'a> SignInGuard<'a> {
    fn enter(shared: &'a Shared) -> Self {
        shared.signing_in.fetch_add(1, Ordering::SeqCst);
        Self { shared }
    }
}

impl Drop for SignInGuard<'_> {
    fn drop(&mut self) {
        self.shared.signing_in.fetch_sub(1, Ordering::SeqCst);
    }
}
