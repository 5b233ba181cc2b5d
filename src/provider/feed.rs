use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::error::Error;
use crate::types::Session;

/// Producer half of a provider's session-change notifications.
///
/// Holds the provider's current session and at most one live subscriber.
/// Provider implementations call [`publish`](Self::publish) after every
/// state-changing call.
#[derive(Debug, Default)]
pub struct SessionFeed {
    inner: Mutex<FeedInner>,
}

#[derive(Debug, Default)]
struct FeedInner {
    current: Option<Session>,
    subscriber: Option<mpsc::UnboundedSender<Option<Session>>>,
}

impl SessionFeed {
    #[must_use]
    pub fn new(initial: Option<Session>) -> Self {
        Self {
            inner: Mutex::new(FeedInner {
                current: initial,
                subscriber: None,
            }),
        }
    }

    /// The session most recently published.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.lock().current.clone()
    }

    /// Open the single subscription. The current state is queued as the first event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySubscribed`] if a previous [`SessionEvents`] is still alive.
    pub fn subscribe(&self) -> Result<SessionEvents, Error> {
        let mut inner = self.lock();
        if inner.subscriber.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Err(Error::AlreadySubscribed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, send cannot fail.
        let _ = tx.send(inner.current.clone());
        inner.subscriber = Some(tx);

        tracing::debug!(signed_in = inner.current.is_some(), "Session feed subscribed");
        Ok(SessionEvents { rx })
    }

    /// Record a new provider state and deliver it to the subscriber, if any.
    pub fn publish(&self, session: Option<Session>) {
        let mut inner = self.lock();
        inner.current.clone_from(&session);

        let delivered = inner
            .subscriber
            .as_ref()
            .is_some_and(|tx| tx.send(session).is_ok());
        if !delivered && inner.subscriber.take().is_some() {
            tracing::debug!("Session subscriber gone, dropping sender");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FeedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Consumer half: the session-change stream handed out by
/// [`IdentityProvider::subscribe`](super::IdentityProvider::subscribe).
///
/// Dropping it ends the subscription.
#[derive(Debug)]
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<Option<Session>>,
}

impl SessionEvents {
    /// Wait for the next session change.
    ///
    /// The inner value is the delivered state (`None` = signed out). The outer
    /// `None` means the provider is gone and no more events will arrive.
    pub async fn next_change(&mut self) -> Option<Option<Session>> {
        self.rx.recv().await
    }
}

impl Drop for SessionEvents {
    fn drop(&mut self) {
        tracing::debug!("Session subscription closed");
    }
}
