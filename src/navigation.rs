use std::fmt;

use crate::observer::AuthState;

/// The two top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Redirect target for an auth state. Only a present session reaches home.
#[must_use]
pub fn route_for(state: &AuthState) -> Route {
    match state {
        AuthState::Authenticated(_) => Route::Home,
        AuthState::Determining | AuthState::Unauthenticated => Route::Login,
    }
}
