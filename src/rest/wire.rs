use serde::{Deserialize, Serialize};

use crate::error::{Error, ProviderErrorCode};
use crate::types::{Session, UserId};

/// Body for `accounts:signInWithPassword` and `accounts:signUp`.
///
/// Anonymous sign-up sends neither credential.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CredentialRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) password: Option<&'a str>,
    pub(super) return_secure_token: bool,
}

impl<'a> CredentialRequest<'a> {
    pub(super) fn password(email: &'a str, password: &'a str) -> Self {
        Self {
            email: Some(email),
            password: Some(password),
            return_secure_token: true,
        }
    }

    pub(super) fn anonymous() -> Self {
        Self {
            email: None,
            password: None,
            return_secure_token: true,
        }
    }
}

/// Successful sign-in / sign-up response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountResponse {
    pub(super) local_id: String,
    #[serde(default)]
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) display_name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    pub(super) photo_url: Option<String>,
    #[serde(default)]
    pub(super) id_token: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AccountResponse {
    pub(super) fn into_session(self) -> (Session, Option<String>) {
        let session = Session {
            uid: UserId(self.local_id),
            email: non_empty(self.email),
            display_name: non_empty(self.display_name),
            photo_url: non_empty(self.photo_url),
        };
        (session, self.id_token)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map an error response body onto a provider error.
///
/// Bodies look like `{"error":{"code":400,"message":"WEAK_PASSWORD : Password should be ..."}}`.
/// Anything else becomes [`ProviderErrorCode::Other`] carrying the HTTP status.
pub(super) fn provider_error(status: u16, body: &str) -> Error {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return Error::provider(
            ProviderErrorCode::Other(format!("http-{status}")),
            if body.is_empty() {
                format!("Request failed with status {status}")
            } else {
                body.to_owned()
            },
        );
    };

    let raw = envelope.error.message;
    let (token, detail) = match raw.split_once(" : ") {
        Some((token, detail)) => (token.trim(), Some(detail.trim())),
        None => (raw.trim(), None),
    };

    let code = match token {
        "EMAIL_NOT_FOUND" => ProviderErrorCode::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => ProviderErrorCode::InvalidCredential,
        "USER_DISABLED" => ProviderErrorCode::UserDisabled,
        "EMAIL_EXISTS" => ProviderErrorCode::EmailAlreadyInUse,
        "INVALID_EMAIL" => ProviderErrorCode::InvalidEmail,
        "WEAK_PASSWORD" => ProviderErrorCode::WeakPassword,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => ProviderErrorCode::TooManyRequests,
        "OPERATION_NOT_ALLOWED" | "ADMIN_ONLY_OPERATION" => ProviderErrorCode::OperationNotAllowed,
        other => ProviderErrorCode::Other(other.to_ascii_lowercase().replace('_', "-")),
    };

    let message = detail.map_or_else(|| default_message(&code, token), str::to_owned);
    Error::provider(code, message)
}

fn default_message(code: &ProviderErrorCode, token: &str) -> String {
    match code {
        ProviderErrorCode::UserNotFound => "There is no user record corresponding to this identifier",
        ProviderErrorCode::InvalidCredential => "The supplied auth credential is incorrect",
        ProviderErrorCode::UserDisabled => "The user account has been disabled",
        ProviderErrorCode::EmailAlreadyInUse => "The email address is already in use by another account",
        ProviderErrorCode::InvalidEmail => "The email address is badly formatted",
        ProviderErrorCode::WeakPassword => "The password is too weak",
        ProviderErrorCode::TooManyRequests => "Too many attempts, try again later",
        ProviderErrorCode::OperationNotAllowed => "This sign-in method is disabled",
        _ => return token.to_owned(),
    }
    .to_owned()
}
