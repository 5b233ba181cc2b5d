use std::sync::{Mutex, PoisonError};

use super::config::RestConfig;
use super::wire::{AccountResponse, CredentialRequest, provider_error};
use crate::error::Error;
use crate::provider::{IdentityProvider, SessionEvents, SessionFeed};
use crate::types::Session;

/// [`IdentityProvider`] backed by the identity-toolkit REST API.
///
/// The session lives in this process only: sign-out forgets the ID token and
/// reports `None`. Tokens are never refreshed or verified here.
pub struct RestIdentityProvider {
    config: RestConfig,
    http: reqwest::Client,
    id_token: Mutex<Option<String>>,
    feed: SessionFeed,
}

impl RestIdentityProvider {
    #[must_use]
    pub fn new(config: RestConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            id_token: Mutex::new(None),
            feed: SessionFeed::default(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// ID token of the current session, for calls to the app's own backend.
    #[must_use]
    pub fn id_token(&self) -> Option<String> {
        self.id_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn account_call(
        &self,
        method: &'static str,
        body: &CredentialRequest<'_>,
    ) -> Result<Session, Error> {
        let url = self.config.endpoint(method)?;

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, method, "Identity request failed"))?;

        let response = Self::ensure_success(response, method).await?;
        let account = response.json::<AccountResponse>().await?;
        let (session, id_token) = account.into_session();

        *self.id_token.lock().unwrap_or_else(PoisonError::into_inner) = id_token;
        tracing::info!(uid = %session.uid, method, "Identity provider signed in");
        self.feed.publish(Some(session.clone()));
        Ok(session)
    }

    /// Checks HTTP response status; returns the response on success or the mapped provider error.
    async fn ensure_success(
        response: reqwest::Response,
        method: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let err = provider_error(status, &body);
        tracing::debug!(status, method, error = %err, "Identity provider rejected request");
        Err(err)
    }
}

impl IdentityProvider for RestIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        self.account_call(
            "signInWithPassword",
            &CredentialRequest::password(email, password),
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, Error> {
        self.account_call("signUp", &CredentialRequest::password(email, password))
            .await
    }

    async fn sign_in_anonymously(&self) -> Result<Session, Error> {
        self.account_call("signUp", &CredentialRequest::anonymous())
            .await
    }

    async fn sign_out(&self) -> Result<(), Error> {
        let had_token = self
            .id_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if had_token || self.feed.current().is_some() {
            tracing::info!("Identity provider signed out");
            self.feed.publish(None);
        }
        Ok(())
    }

    fn subscribe(&self) -> Result<SessionEvents, Error> {
        self.feed.subscribe()
    }
}
