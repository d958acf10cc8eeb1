//! The signed-in user's own profile

use super::{more_label, skill_preview};
use crate::services::require_login;
use crate::Result;
use skillswap_core::UserProfile;
use skillswap_session::SessionContext;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileScreen {
    pub profile: UserProfile,
    /// True when nothing could be loaded and a stand-in is shown
    pub is_placeholder: bool,
}

impl ProfileScreen {
    /// Load the profile from the store
    ///
    /// A missing or unreadable document gives a stand-in profile named after
    /// the account, not an error.
    pub async fn load(session: &SessionContext) -> Result<Self> {
        let me = require_login(session, "view your profile")?;
        match session.refresh_profile().await {
            Ok(Some(profile)) => {
                return Ok(ProfileScreen {
                    profile,
                    is_placeholder: false,
                })
            }
            Ok(None) => {}
            Err(e) => warn!("Could not load profile for {}: {}", me.uid, e),
        }

        let mut profile = UserProfile::placeholder(Some(me.email.clone()));
        if let Some(name) = me.display_name.filter(|n| !n.trim().is_empty()) {
            profile.name = name;
        }
        Ok(ProfileScreen {
            profile,
            is_placeholder: true,
        })
    }

    /// Teach skills as shown on the summary card
    pub fn teach_summary(&self) -> (Vec<String>, Option<String>) {
        let (shown, more) = skill_preview(&self.profile.skills_to_teach);
        (shown, more_label(more))
    }

    pub fn learn_summary(&self) -> (Vec<String>, Option<String>) {
        let (shown, more) = skill_preview(&self.profile.skills_to_learn);
        (shown, more_label(more))
    }
}
