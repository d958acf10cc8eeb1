//! Profile editor
//!
//! Opens with the cached profile so the form fills in at once, then replaces
//! it with the stored document when that arrives.

use crate::services::require_login;
use crate::{Notice, Result};
use skillswap_core::{ProfileDraft, SkillEdit, SkillList, UserProfile};
use skillswap_session::SessionContext;
use std::sync::Arc;

/// Which of the two skill lists an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    Teach,
    Learn,
}

pub struct EditProfileScreen {
    session: Arc<SessionContext>,
    draft: ProfileDraft,
    certifications: Option<String>,
}

impl EditProfileScreen {
    /// Start from the cached profile, or an empty form
    pub async fn open(session: Arc<SessionContext>) -> Result<Self> {
        require_login(&session, "edit your profile")?;
        let cached = session.cached_profile().await;
        let mut screen = EditProfileScreen {
            session,
            draft: ProfileDraft::default(),
            certifications: None,
        };
        if let Some(profile) = cached {
            screen.fill(&profile);
        }
        Ok(screen)
    }

    /// Replace the form with the stored profile, if there is one
    pub async fn load_remote(&mut self) -> Result<bool> {
        match self.session.refresh_profile().await? {
            Some(profile) => {
                self.fill(&profile);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn fill(&mut self, profile: &UserProfile) {
        self.draft = ProfileDraft::from_profile(profile);
        self.certifications = profile.certifications.clone();
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_bio(&mut self, bio: impl Into<String>) {
        self.draft.bio = bio.into();
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.draft.image = image;
    }

    fn list_mut(&mut self, kind: SkillKind) -> &mut SkillList {
        match kind {
            SkillKind::Teach => &mut self.draft.skills_to_teach,
            SkillKind::Learn => &mut self.draft.skills_to_learn,
        }
    }

    /// Add a skill; a duplicate is refused with a "Duplicate Skill" error
    pub fn add_skill(&mut self, kind: SkillKind, skill: &str) -> Result<SkillEdit> {
        Ok(self.list_mut(kind).add(skill)?)
    }

    pub fn remove_skill(&mut self, kind: SkillKind, index: usize) -> Option<String> {
        self.list_mut(kind).remove_at(index)
    }

    /// Remove a skill by name, in any letter case
    pub fn remove_skill_named(&mut self, kind: SkillKind, skill: &str) -> Option<String> {
        let list = self.list_mut(kind);
        let index = list.position_ignore_case(skill)?;
        list.remove_at(index)
    }

    pub async fn save(&self) -> Result<(UserProfile, Notice)> {
        let identity = require_login(&self.session, "edit your profile")?;
        let mut profile = self.draft.clone().into_profile(Some(identity.email))?;
        profile.certifications = self.certifications.clone();
        let saved = self.session.save_profile(profile).await?;
        Ok((
            saved,
            Notice::success("Your profile has been updated successfully"),
        ))
    }
}
