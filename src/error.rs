use std::fmt;

/// Provider-defined failure categories.
///
/// `Display` renders the `auth/...` code string that identity SDKs report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderErrorCode {
    InvalidCredential,
    UserNotFound,
    UserDisabled,
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    TooManyRequests,
    OperationNotAllowed,
    Network,
    Other(String),
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::InvalidCredential => "invalid-credential",
            Self::UserNotFound => "user-not-found",
            Self::UserDisabled => "user-disabled",
            Self::EmailAlreadyInUse => "email-already-in-use",
            Self::InvalidEmail => "invalid-email",
            Self::WeakPassword => "weak-password",
            Self::TooManyRequests => "too-many-requests",
            Self::OperationNotAllowed => "operation-not-allowed",
            Self::Network => "network-request-failed",
            Self::Other(code) => code,
        };
        write!(f, "auth/{code}")
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The identity provider rejected the request.
    #[error("{message} ({code})")]
    Provider {
        code: ProviderErrorCode,
        message: String,
    },
    #[cfg(feature = "rest")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    /// The provider's session feed already has a live subscriber.
    #[error("session feed already has a subscriber")]
    AlreadySubscribed,
}

impl Error {
    pub(crate) fn provider(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self::Provider {
            code,
            message: message.into(),
        }
    }

    /// Provider error code, if this is a provider rejection.
    #[must_use]
    pub fn provider_code(&self) -> Option<&ProviderErrorCode> {
        match self {
            Self::Provider { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the failure came from the transport rather than the provider's verdict.
    #[must_use]
    pub fn is_network(&self) -> bool {
        match self {
            Self::Provider { code, .. } => *code == ProviderErrorCode::Network,
            #[cfg(feature = "rest")]
            Self::Http(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_includes_code() {
        let err = Error::provider(ProviderErrorCode::InvalidCredential, "Wrong email or password");
        assert_eq!(
            err.to_string(),
            "Wrong email or password (auth/invalid-credential)"
        );
    }

    #[test]
    fn other_code_passes_through() {
        let code = ProviderErrorCode::Other("quota-exceeded".into());
        assert_eq!(code.to_string(), "auth/quota-exceeded");
    }

    #[test]
    fn network_classification() {
        assert!(Error::provider(ProviderErrorCode::Network, "offline").is_network());
        assert!(!Error::provider(ProviderErrorCode::UserNotFound, "nope").is_network());
        assert!(!Error::AlreadySubscribed.is_network());
    }
}
