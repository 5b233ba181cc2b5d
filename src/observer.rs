//! Reactive view of the provider's session.
//!
//! [`SessionObserver`] is the single consumer of the provider's session feed.
//! Each change is published to dependents at once and handed to a separate
//! mirror task that writes it into the [`ProfileCache`]. Storage never sits
//! between the feed and the state the UI routes on.
//!
//! # Example
//!
//! ```rust,ignore
//! let provider = Arc::new(DevIdentityProvider::new());
//! let observer = SessionObserver::start(provider, ProfileCache::new(MemoryStore::new()))?;
//!
//! let state = observer.wait_until_determined().await;
//! navigate(route_for(&state));
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::cache::ProfileCache;
use crate::error::Error;
use crate::navigation::{Route, route_for};
use crate::provider::{IdentityProvider, SessionEvents};
use crate::store::KeyValueStore;
use crate::types::Session;

/// Session state as seen by dependents.
///
/// `Determining` holds from [`SessionObserver::start`] until the provider's first
/// report and is never re-entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Determining,
    Authenticated(Session),
    Unauthenticated,
}

impl AuthState {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Determining | Self::Unauthenticated => None,
        }
    }

    #[must_use]
    pub fn is_determining(&self) -> bool {
        matches!(self, Self::Determining)
    }
}

impl From<Option<Session>> for AuthState {
    fn from(session: Option<Session>) -> Self {
        session.map_or(Self::Unauthenticated, Self::Authenticated)
    }
}

/// Work for the mirror task, applied strictly in arrival order.
#[derive(Debug)]
enum MirrorCommand {
    Write(Session),
    Clear,
    /// Clear requested by [`SessionObserver::sign_out`]. Skipped while a session
    /// is published. The pump's own commands for that session settle the cache.
    SignedOut(oneshot::Sender<()>),
}

/// Owns the provider subscription and the current [`AuthState`].
///
/// Pass it (or an `Arc` of it) to whatever needs the signed-in user. Dropping
/// it ends the subscription.
pub struct SessionObserver<P, K> {
    provider: Arc<P>,
    cache: Arc<ProfileCache<K>>,
    state: watch::Receiver<AuthState>,
    mirror: mpsc::UnboundedSender<MirrorCommand>,
    pump: JoinHandle<()>,
    mirror_task: JoinHandle<()>,
}

impl<P: IdentityProvider, K: KeyValueStore> SessionObserver<P, K> {
    /// Subscribe to `provider` and start tracking its session.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySubscribed`] if something else holds the provider's feed.
    pub fn start(provider: Arc<P>, cache: ProfileCache<K>) -> Result<Self, Error> {
        let events = provider.subscribe()?;
        let cache = Arc::new(cache);
        let (state_tx, state_rx) = watch::channel(AuthState::Determining);
        let (mirror_tx, mirror_rx) = mpsc::unbounded_channel();

        let mirror_task = tokio::spawn(mirror(mirror_rx, state_rx.clone(), Arc::clone(&cache)));
        let pump = tokio::spawn(pump(events, state_tx, mirror_tx.clone()));

        Ok(Self {
            provider,
            cache,
            state: state_rx,
            mirror: mirror_tx,
            pump,
            mirror_task,
        })
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// `true` until the provider has reported for the first time.
    #[must_use]
    pub fn is_determining(&self) -> bool {
        self.state.borrow().is_determining()
    }

    /// Receiver that wakes on every state change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Wait for the provider's first report and return the resulting state.
    ///
    /// If the provider goes away before reporting, the state stays `Determining`.
    pub async fn wait_until_determined(&self) -> AuthState {
        let mut rx = self.state.clone();
        let determined = match rx.wait_for(|state| !state.is_determining()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        determined
    }

    /// Where the app should be for the current state.
    #[must_use]
    pub fn route(&self) -> Route {
        route_for(&self.state.borrow())
    }

    /// Ask the provider to end the session, then drop the cached profile.
    ///
    /// The clear is queued behind any cache writes still pending and this call
    /// returns once it has been applied. The session itself changes only when
    /// the provider reports it through the feed.
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged. Nothing local is touched in that case.
    pub async fn sign_out(&self) -> Result<(), Error> {
        if let Err(e) = self.provider.sign_out().await {
            tracing::error!(error = %e, "Sign-out failed");
            return Err(e);
        }

        let (done_tx, done_rx) = oneshot::channel();
        let queued = self.mirror.send(MirrorCommand::SignedOut(done_tx)).is_ok();
        if !queued || done_rx.await.is_err() {
            tracing::debug!("Cache mirror stopped before sign-out clear");
        }
        Ok(())
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    #[must_use]
    pub fn cache(&self) -> &ProfileCache<K> {
        &self.cache
    }
}

impl<P, K> Drop for SessionObserver<P, K> {
    fn drop(&mut self) {
        self.pump.abort();
        self.mirror_task.abort();
    }
}

async fn pump(
    mut events: SessionEvents,
    state: watch::Sender<AuthState>,
    mirror: mpsc::UnboundedSender<MirrorCommand>,
) {
    while let Some(change) = events.next_change().await {
        let previous = state.send_replace(AuthState::from(change.clone()));
        if previous.is_determining() {
            tracing::info!(signed_in = change.is_some(), "Initial auth state determined");
        }

        let command = match change {
            Some(session) => {
                tracing::debug!(uid = %session.uid, "Session present");
                MirrorCommand::Write(session)
            }
            None => {
                tracing::debug!("Session absent");
                MirrorCommand::Clear
            }
        };
        if mirror.send(command).is_err() {
            tracing::debug!("Cache mirror stopped");
        }
    }
    tracing::debug!("Session feed closed");
}

async fn mirror<K: KeyValueStore>(
    mut commands: mpsc::UnboundedReceiver<MirrorCommand>,
    state: watch::Receiver<AuthState>,
    cache: Arc<ProfileCache<K>>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            MirrorCommand::Write(session) => cache.write(&session).await,
            MirrorCommand::Clear => cache.clear().await,
            MirrorCommand::SignedOut(done) => {
                let superseded = state.borrow().session().is_some();
                if superseded {
                    tracing::debug!("Session still published, leaving clear to the pump");
                } else {
                    cache.clear().await;
                }
                let _ = done.send(());
            }
        }
    }
}
