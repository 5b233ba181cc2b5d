//! Home screen view model.

use crate::navigation::Route;
use crate::observer::SessionObserver;
use crate::provider::IdentityProvider;
use crate::store::KeyValueStore;
use crate::types::Session;

const NOT_SET: &str = "(Not set)";
const GUEST: &str = "Guest";
const LOGOUT_FAILED: &str = "Failed to logout";

/// Profile rows shown for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub greeting: String,
    pub display_name: String,
    pub email: String,
    pub user_id: String,
    pub avatar_url: Option<String>,
}

impl From<&Session> for ProfileView {
    fn from(session: &Session) -> Self {
        let email = session.email.clone().unwrap_or_default();
        let name = session
            .display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| Some(email.as_str()).filter(|e| !e.is_empty()))
            .unwrap_or(GUEST);

        Self {
            greeting: format!("Hello, {name}!"),
            display_name: session
                .display_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| NOT_SET.to_owned()),
            user_id: session.uid.to_string(),
            avatar_url: session.photo_url.clone(),
            email,
        }
    }
}

/// Signed-in landing screen: shows the current user's profile and offers logout.
pub struct HomeScreen<'a, P, K> {
    observer: &'a SessionObserver<P, K>,
    error: Option<String>,
}

impl<'a, P: IdentityProvider, K: KeyValueStore> HomeScreen<'a, P, K> {
    #[must_use]
    pub fn new(observer: &'a SessionObserver<P, K>) -> Self {
        Self {
            observer,
            error: None,
        }
    }

    /// Rows for the current user, `None` while nobody is signed in.
    #[must_use]
    pub fn profile(&self) -> Option<ProfileView> {
        self.observer.current_user().as_ref().map(ProfileView::from)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sign out and go back to the login screen. Stays here if the provider refuses.
    pub async fn logout(&mut self) -> Option<Route> {
        match self.observer.sign_out().await {
            Ok(()) => {
                self.error = None;
                Some(Route::Login)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Logout failed");
                self.error = Some(LOGOUT_FAILED.to_owned());
                None
            }
        }
    }
}
