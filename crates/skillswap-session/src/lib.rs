//! Session state for SkillSwap
//!
//! Tracks who is signed in and their profile, backed by:
//! - an [`AuthProvider`](skillswap_store::AuthProvider) for credentials
//! - a [`RemoteStore`](skillswap_store::RemoteStore) for the profile document
//! - a [`LocalCache`] so the last session survives restarts

pub mod cache;
pub mod context;

pub use cache::{
    CacheError, CachedProfile, FileCache, LocalCache, LocalCacheExt, MemoryCache, PROFILE_KEY,
    USER_KEY,
};
pub use context::{register_topics, LoginStatus, SessionContext, SessionState};

use skillswap_core::CoreError;
use skillswap_store::{AuthError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Please verify your email before logging in.")]
    EmailNotVerified,

    #[error("You need to be logged in")]
    NotLoggedIn,
}

pub type Result<T> = std::result::Result<T, SessionError>;
