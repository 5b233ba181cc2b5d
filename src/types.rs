use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

/// Provider-assigned account identifier.
///
/// Opaque and stable per account. The format belongs to the identity provider
/// (Firebase-style `localId`, ULID for the dev provider, etc.).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The signed-in identity as reported by the identity provider.
///
/// Only the provider creates sessions. UI code reads them through
/// [`SessionObserver`](crate::SessionObserver) and can at most ask for a sign-out.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Session {
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Session {
    /// Create a session with only the required identifier.
    #[must_use]
    pub fn new(uid: impl Into<UserId>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Anonymous sessions carry neither an email nor a display name.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.email.is_none() && self.display_name.is_none()
    }
}

/// Denormalized copy of a [`Session`] as persisted under the profile cache key.
///
/// Absent fields serialize as `null`, so the stored JSON always has all four keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CachedProfile {
    pub uid: UserId,
    pub email: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl From<&Session> for CachedProfile {
    fn from(session: &Session) -> Self {
        Self {
            uid: session.uid.clone(),
            email: session.email.clone(),
            display_name: session.display_name.clone(),
            photo_url: session.photo_url.clone(),
        }
    }
}
