//! Notifications received by the signed-in user

use crate::services::{notifications, require_login};
use crate::Result;
use skillswap_core::Notification;
use skillswap_session::SessionContext;

#[derive(Debug, Clone, Default)]
pub struct InboxScreen {
    /// Push key and notification, newest first
    pub items: Vec<(String, Notification)>,
}

impl InboxScreen {
    pub async fn load(session: &SessionContext) -> Result<Self> {
        let me = require_login(session, "view notifications")?;
        let items = notifications::list_notifications(session.store().as_ref(), &me.uid).await?;
        Ok(InboxScreen { items })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
