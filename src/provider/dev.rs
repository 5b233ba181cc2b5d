use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use ulid::Ulid;

use super::IdentityProvider;
use super::feed::{SessionEvents, SessionFeed};
use crate::error::{Error, ProviderErrorCode};
use crate::types::{Session, UserId};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct DevAccount {
    uid: UserId,
    password: String,
    display_name: Option<String>,
    photo_url: Option<String>,
}

/// In-process identity provider for local development and tests.
///
/// Accounts live in memory and identifiers are fresh ULIDs. Failure modes follow
/// hosted providers closely enough for UI flows to exercise every error path,
/// and [`set_offline`](Self::set_offline) simulates an unreachable backend.
#[derive(Debug, Default)]
pub struct DevIdentityProvider {
    accounts: Mutex<HashMap<String, DevAccount>>,
    offline: AtomicBool,
    feed: SessionFeed,
}

impl DevIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing account.
    #[must_use]
    pub fn with_account(
        self,
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: Option<&str>,
    ) -> Self {
        let account = DevAccount {
            uid: UserId(Ulid::new().to_string()),
            password: password.into(),
            display_name: display_name.map(str::to_owned),
            photo_url: None,
        };
        self.lock_accounts().insert(email.into(), account);
        self
    }

    /// Start with `session` already signed in, as if restored from a previous launch.
    #[must_use]
    pub fn with_restored_session(self, session: Session) -> Self {
        self.feed.publish(Some(session));
        self
    }

    /// While offline every call fails with [`ProviderErrorCode::Network`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The provider's own view of the signed-in user.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.feed.current()
    }

    fn ensure_online(&self) -> Result<(), Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::provider(
                ProviderErrorCode::Network,
                "A network error has occurred",
            ));
        }
        Ok(())
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, DevAccount>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_session(&self, session: Session) -> Session {
        tracing::info!(uid = %session.uid, "Dev provider signed in");
        self.feed.publish(Some(session.clone()));
        session
    }
}

fn session_for(email: &str, account: &DevAccount) -> Session {
    Session {
        uid: account.uid.clone(),
        email: Some(email.to_owned()),
        display_name: account.display_name.clone(),
        photo_url: account.photo_url.clone(),
    }
}

impl IdentityProvider for DevIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        self.ensure_online()?;

        let session = {
            let accounts = self.lock_accounts();
            let account = accounts.get(email).ok_or_else(|| {
                Error::provider(
                    ProviderErrorCode::UserNotFound,
                    "There is no user record corresponding to this identifier",
                )
            })?;
            if account.password != password {
                return Err(Error::provider(
                    ProviderErrorCode::InvalidCredential,
                    "The supplied auth credential is incorrect",
                ));
            }
            session_for(email, account)
        };

        Ok(self.start_session(session))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, Error> {
        self.ensure_online()?;

        if !email.contains('@') {
            return Err(Error::provider(
                ProviderErrorCode::InvalidEmail,
                "The email address is badly formatted",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::provider(
                ProviderErrorCode::WeakPassword,
                "Password should be at least 6 characters",
            ));
        }

        let session = {
            let mut accounts = self.lock_accounts();
            if accounts.contains_key(email) {
                return Err(Error::provider(
                    ProviderErrorCode::EmailAlreadyInUse,
                    "The email address is already in use by another account",
                ));
            }
            let account = DevAccount {
                uid: UserId(Ulid::new().to_string()),
                password: password.to_owned(),
                display_name: None,
                photo_url: None,
            };
            let session = session_for(email, &account);
            accounts.insert(email.to_owned(), account);
            session
        };

        Ok(self.start_session(session))
    }

    async fn sign_in_anonymously(&self) -> Result<Session, Error> {
        self.ensure_online()?;
        Ok(self.start_session(Session::new(Ulid::new().to_string())))
    }

    async fn sign_out(&self) -> Result<(), Error> {
        self.ensure_online()?;
        if self.feed.current().is_some() {
            tracing::info!("Dev provider signed out");
            self.feed.publish(None);
        }
        Ok(())
    }

    fn subscribe(&self) -> Result<SessionEvents, Error> {
        self.feed.subscribe()
    }
}
