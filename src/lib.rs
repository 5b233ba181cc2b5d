#![doc = include_str!("../README.md")]

pub mod cache;
pub mod error;
pub mod home;
pub mod login;
pub mod navigation;
pub mod observer;
pub mod provider;
#[cfg(feature = "rest")]
pub mod rest;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use cache::{PROFILE_KEY, ProfileCache};
pub use error::{Error, ProviderErrorCode};
pub use home::{HomeScreen, ProfileView};
pub use login::{LoginMode, LoginScreen};
pub use navigation::{Route, route_for};
pub use observer::{AuthState, SessionObserver};
pub use provider::{DevIdentityProvider, IdentityProvider, SessionEvents, SessionFeed};
#[cfg(feature = "rest")]
pub use rest::{RestConfig, RestIdentityProvider};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use types::{CachedProfile, Session, UserId};
