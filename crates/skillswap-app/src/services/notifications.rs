//! Connect requests and the notification inbox

use super::require_login;
use crate::Result;
use chrono::Utc;
use skillswap_core::{Notification, UserId};
use skillswap_session::SessionContext;
use skillswap_store::{RemoteStore, StorePath};
use tracing::info;

/// Ask `teacher` to connect, returning the key of the new notification
///
/// The sender is named by their profile name, then the account display
/// name, else "A user".
pub async fn send_connect_request(session: &SessionContext, teacher: &UserId) -> Result<String> {
    let me = require_login(session, "connect")?;
    let profile_name = session.profile().map(|p| p.name);
    let name = profile_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or(me.display_name.as_deref());

    let notification = Notification::connect_request(me.uid.clone(), name, Utc::now());
    let value = serde_json::to_value(&notification).map_err(skillswap_store::StoreError::from)?;
    let key = session
        .store()
        .push(&StorePath::notifications(teacher), value)
        .await?;
    info!("{} sent a connect request to {}", me.uid, teacher);
    Ok(key)
}

/// Notifications for `uid`, newest first
pub async fn list_notifications(
    store: &dyn RemoteStore,
    uid: &UserId,
) -> Result<Vec<(String, Notification)>> {
    let value = store.get(&StorePath::notifications(uid)).await?;
    Ok(Notification::list_from_value(value.as_ref()))
}
