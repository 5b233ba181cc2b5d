//! Login screen controller.
//!
//! Holds the form and the displayed error; every action returns the route to
//! navigate to, or `None` to stay put.

use std::sync::Arc;

use crate::error::{Error, ProviderErrorCode};
use crate::navigation::Route;
use crate::provider::IdentityProvider;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password123";

const MISSING_FIELDS: &str = "Please enter both email and password";

/// Whether the primary button signs in or creates an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    SignIn,
    SignUp,
}

impl LoginMode {
    #[must_use]
    pub fn button_label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Create Account",
        }
    }

    #[must_use]
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::SignIn => "Don't have an account? Sign Up",
            Self::SignUp => "Already have an account? Sign In",
        }
    }
}

/// Sign-in form backed by an [`IdentityProvider`].
pub struct LoginScreen<P> {
    provider: Arc<P>,
    email: String,
    password: String,
    mode: LoginMode,
    error: Option<String>,
}

impl<P: IdentityProvider> LoginScreen<P> {
    /// New screen, prefilled with the demo credentials.
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            email: DEMO_EMAIL.to_owned(),
            password: DEMO_PASSWORD.to_owned(),
            mode: LoginMode::default(),
            error: None,
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::SignUp,
            LoginMode::SignUp => LoginMode::SignIn,
        };
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    /// Message to show above the form, if the last action failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sign in or sign up with the form fields, depending on [`mode`](Self::mode).
    pub async fn submit(&mut self) -> Option<Route> {
        if self.email.is_empty() || self.password.is_empty() {
            self.error = Some(MISSING_FIELDS.to_owned());
            return None;
        }
        self.error = None;

        let result = match self.mode {
            LoginMode::SignIn => {
                self.provider
                    .sign_in_with_password(&self.email, &self.password)
                    .await
            }
            LoginMode::SignUp => self.provider.sign_up(&self.email, &self.password).await,
        };
        self.finish(result.map(drop), "Auth error")
    }

    /// Sign in as the demo user, creating it on first use.
    pub async fn demo_login(&mut self) -> Option<Route> {
        self.error = None;

        let result = match self
            .provider
            .sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD)
            .await
        {
            Err(e) if e.provider_code() == Some(&ProviderErrorCode::UserNotFound) => {
                tracing::info!("Demo account missing, creating it");
                self.provider.sign_up(DEMO_EMAIL, DEMO_PASSWORD).await
            }
            other => other,
        };
        self.finish(result.map(drop), "Demo login error")
    }

    /// The "Sign in with Google" button.
    ///
    /// Performs an anonymous sign-in. No Google account is involved.
    pub async fn sign_in_with_google(&mut self) -> Option<Route> {
        self.error = None;
        let result = self.provider.sign_in_anonymously().await;
        self.finish(result.map(drop), "Sign in error")
    }

    fn finish(&mut self, result: Result<(), Error>, context: &'static str) -> Option<Route> {
        match result {
            Ok(()) => Some(Route::Home),
            Err(e) => {
                tracing::warn!(error = %e, "{context}");
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DevIdentityProvider;

    fn screen(
        provider: DevIdentityProvider,
    ) -> (Arc<DevIdentityProvider>, LoginScreen<DevIdentityProvider>) {
        let provider = Arc::new(provider);
        (Arc::clone(&provider), LoginScreen::new(provider))
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_locally() {
        let (provider, mut screen) = screen(DevIdentityProvider::new());
        screen.set_password("");

        assert_eq!(screen.submit().await, None);
        assert_eq!(screen.error(), Some(MISSING_FIELDS));
        assert_eq!(provider.current_session(), None);
    }

    #[tokio::test]
    async fn invalid_credential_stays_on_login() {
        let (provider, mut screen) =
            screen(DevIdentityProvider::new().with_account("a@b.com", "secret1", None));
        screen.set_email("a@b.com");
        screen.set_password("wrong-password");

        assert_eq!(screen.submit().await, None);
        let message = screen.error().unwrap();
        assert!(!message.is_empty());
        assert!(message.contains("auth/invalid-credential"));
        assert_eq!(provider.current_session(), None);
    }

    #[tokio::test]
    async fn successful_sign_in_goes_home_and_clears_error() {
        let (provider, mut screen) =
            screen(DevIdentityProvider::new().with_account("a@b.com", "secret1", None));
        screen.set_email("a@b.com");
        screen.set_password("nope");
        screen.submit().await;
        assert!(screen.error().is_some());

        screen.set_password("secret1");
        assert_eq!(screen.submit().await, Some(Route::Home));
        assert_eq!(screen.error(), None);
        assert!(provider.current_session().is_some());
    }

    #[tokio::test]
    async fn sign_up_mode_creates_account() {
        let (provider, mut screen) = screen(DevIdentityProvider::new());
        screen.toggle_mode();
        assert_eq!(screen.mode(), LoginMode::SignUp);
        assert_eq!(screen.mode().button_label(), "Create Account");

        screen.set_email("new@b.com");
        screen.set_password("secret1");
        assert_eq!(screen.submit().await, Some(Route::Home));
        assert_eq!(
            provider.current_session().unwrap().email.as_deref(),
            Some("new@b.com")
        );

        screen.toggle_mode();
        assert_eq!(screen.mode(), LoginMode::SignIn);
    }

    #[tokio::test]
    async fn demo_login_creates_then_reuses_account() {
        let (provider, mut screen) = screen(DevIdentityProvider::new());

        assert_eq!(screen.demo_login().await, Some(Route::Home));
        let first = provider.current_session().unwrap();
        assert_eq!(first.email.as_deref(), Some(DEMO_EMAIL));

        assert_eq!(screen.demo_login().await, Some(Route::Home));
        assert_eq!(provider.current_session().unwrap().uid, first.uid);
    }

    #[tokio::test]
    async fn demo_login_surfaces_other_errors() {
        let (provider, mut screen) =
            screen(DevIdentityProvider::new().with_account(DEMO_EMAIL, "changed", None));

        assert_eq!(screen.demo_login().await, None);
        assert!(screen.error().unwrap().contains("auth/invalid-credential"));
        assert_eq!(provider.current_session(), None);
    }

    #[tokio::test]
    async fn google_button_signs_in_anonymously() {
        let (provider, mut screen) = screen(DevIdentityProvider::new());

        assert_eq!(screen.sign_in_with_google().await, Some(Route::Home));
        assert!(provider.current_session().unwrap().is_anonymous());
    }

    #[tokio::test]
    async fn network_failure_is_displayed() {
        let (provider, mut screen) = screen(DevIdentityProvider::new());
        provider.set_offline(true);

        assert_eq!(screen.sign_in_with_google().await, None);
        assert!(screen.error().unwrap().contains("network"));
    }
}
