//! Screens and services for SkillSwap
//!
//! Services are thin async functions over a
//! [`RemoteStore`](skillswap_store::RemoteStore): ratings, favorites, the
//! user directory, topics and connect requests. Screens are headless view
//! models built on top of them and the [`SessionContext`], each holding the
//! transient state of one view (search text, form fields, rating selection).
//!
//! Failures reach the user as a [`Notice`].

pub mod notice;
pub mod screens;
pub mod services;

pub use notice::Notice;

use skillswap_core::{CoreError, UserId};
use skillswap_session::SessionError;
use skillswap_store::StoreError;
use thiserror::Error;

pub use skillswap_session::SessionContext;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The action needs a signed-in user; the message names the action
    #[error("You must be logged in to {0}")]
    LoginRequired(&'static str),

    #[error("Please select a rating")]
    NoRatingSelected,

    #[error("User {0} not found")]
    UserNotFound(UserId),
}

pub type Result<T> = std::result::Result<T, AppError>;
