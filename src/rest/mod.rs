//! Identity-toolkit REST backend.
//!
//! Talks to the `accounts:*` endpoints of a hosted identity service over HTTPS
//! and reports session changes through a [`SessionFeed`](crate::provider::SessionFeed).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use auth_state_sync::rest::{RestConfig, RestIdentityProvider};
//!
//! // IDENTITY_API_KEY=... (IDENTITY_BASE_URL optional)
//! let provider = RestIdentityProvider::new(RestConfig::from_env()?);
//! let session = provider.sign_in_with_password("a@b.com", "secret1").await?;
//! ```

mod client;
mod config;
mod wire;

pub use client::RestIdentityProvider;
pub use config::RestConfig;
