//! Async operations over the remote store, shared by the screens

pub mod directory;
pub mod favorites;
pub mod notifications;
pub mod ratings;
pub mod topics;

use crate::{AppError, Result};
use skillswap_session::SessionContext;
use skillswap_store::Identity;

/// Signed-in identity, or [`AppError::LoginRequired`] naming `action`
pub(crate) fn require_login(session: &SessionContext, action: &'static str) -> Result<Identity> {
    session.identity().ok_or(AppError::LoginRequired(action))
}
