//! Favorite teachers
//!
//! Membership of `favorites/{uid}/{teacherId}`, whose value is the teacher id.

use super::require_login;
use crate::Result;
use serde_json::Value;
use skillswap_core::{FavoriteSet, UserId};
use skillswap_session::SessionContext;
use skillswap_store::{RemoteStore, RemoteStoreExt, StorePath, Subscription};
use tracing::info;

pub async fn is_favorite(store: &dyn RemoteStore, uid: &UserId, teacher: &UserId) -> Result<bool> {
    Ok(store.exists(&StorePath::favorite(uid, teacher)).await?)
}

pub async fn fetch_favorites(store: &dyn RemoteStore, uid: &UserId) -> Result<FavoriteSet> {
    let value = store.get(&StorePath::favorites(uid)).await?;
    Ok(FavoriteSet::from_value(value.as_ref()))
}

pub fn subscribe_favorites(store: &dyn RemoteStore, uid: &UserId) -> Subscription {
    store.subscribe(&StorePath::favorites(uid))
}

/// Flip whether the signed-in user has `teacher` as a favorite
///
/// The current state is read from the store, not from any local copy.
/// Returns the new state.
pub async fn toggle_favorite(session: &SessionContext, teacher: &UserId) -> Result<bool> {
    let me = require_login(session, "favorite a teacher")?;
    let store = session.store();
    let path = StorePath::favorite(&me.uid, teacher);

    if store.exists(&path).await? {
        store.remove(&path).await?;
        info!("{} removed {} from favorites", me.uid, teacher);
        Ok(false)
    } else {
        store
            .set(&path, Value::String(teacher.to_string()))
            .await?;
        info!("{} added {} to favorites", me.uid, teacher);
        Ok(true)
    }
}
