//! Identity provider seam.
//!
//! The provider owns authentication. This crate only calls it and listens to
//! its session feed. Implementations:
//!
//! - [`DevIdentityProvider`]: in-process accounts for demos and tests
//! - [`RestIdentityProvider`](crate::rest::RestIdentityProvider): identity-toolkit REST API
//!   (feature `rest`)
//!
//! # Example
//!
//! ```rust,ignore
//! impl IdentityProvider for MyProvider {
//!     async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
//!         let session = self.sdk.sign_in(email, password).await?;
//!         self.feed.publish(Some(session.clone()));
//!         Ok(session)
//!     }
//!     // ...
//!     fn subscribe(&self) -> Result<SessionEvents, Error> {
//!         self.feed.subscribe()
//!     }
//! }
//! ```

mod dev;
mod feed;

use std::future::Future;

pub use dev::DevIdentityProvider;
pub use feed::{SessionEvents, SessionFeed};

use crate::error::Error;
use crate::types::Session;

/// Client side of a third-party identity service.
///
/// Every successful sign-in style call must also be reported through the
/// subscription returned by [`subscribe`](IdentityProvider::subscribe), and a
/// successful sign-out must report `None` there. Callers never learn about
/// session changes any other way.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Sign in an existing account with email and password.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, Error>> + Send;

    /// Create an account and sign it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, Error>> + Send;

    /// Sign in without credentials.
    ///
    /// The login screen's "Google" button uses this. No Google identity is involved.
    fn sign_in_anonymously(&self) -> impl Future<Output = Result<Session, Error>> + Send;

    /// Terminate the current session.
    fn sign_out(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Open the session-change stream.
    ///
    /// The first event is the provider's current state. At most one subscription
    /// may be alive at a time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySubscribed`] while another subscription is alive.
    fn subscribe(&self) -> Result<SessionEvents, Error>;
}
