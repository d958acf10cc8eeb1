//! Headless screens
//!
//! One view model per screen of the app. Each holds the data it shows and
//! the transient input of the user; rendering is left to the caller.

pub mod account;
pub mod edit_profile;
pub mod favorites;
pub mod home;
pub mod inbox;
pub mod onboarding;
pub mod profile;
pub mod skill;
pub mod teacher;

pub use account::{LoginScreen, SignupScreen};
pub use edit_profile::{EditProfileScreen, SkillKind};
pub use favorites::{FavoriteCard, FavoritesFeed};
pub use home::{Achievements, HomeScreen};
pub use inbox::InboxScreen;
pub use onboarding::OnboardingForm;
pub use profile::ProfileScreen;
pub use skill::{SkillFeed, SkillMatch};
pub use teacher::TeacherScreen;

use skillswap_core::SkillList;

/// Number of skills shown on a card before "+N more"
pub const SKILL_PREVIEW: usize = 3;

/// First [`SKILL_PREVIEW`] skills and the count left out
pub fn skill_preview(skills: &SkillList) -> (Vec<String>, usize) {
    let (shown, more) = skills.preview(SKILL_PREVIEW);
    (shown.to_vec(), more)
}

/// "+N more" label, if anything was left out
pub fn more_label(more: usize) -> Option<String> {
    (more > 0).then(|| format!("+{} more", more))
}
