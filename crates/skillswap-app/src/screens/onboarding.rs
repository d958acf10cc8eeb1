//! First-run profile form for a new account

use crate::{Notice, Result};
use skillswap_core::{ProfileDraft, SkillList, UserProfile};
use skillswap_session::SessionContext;
use skillswap_store::Identity;

/// Skills are typed as comma-separated lists, e.g. `"guitar, cooking"`
#[derive(Debug, Clone, Default)]
pub struct OnboardingForm {
    pub name: String,
    pub bio: String,
    pub image: Option<String>,
    pub skills_to_teach: String,
    pub skills_to_learn: String,
}

impl OnboardingForm {
    pub fn draft(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.name.clone(),
            bio: self.bio.clone(),
            image: self.image.clone(),
            skills_to_teach: SkillList::parse_csv(&self.skills_to_teach),
            skills_to_learn: SkillList::parse_csv(&self.skills_to_learn),
        }
    }

    /// Write the profile for `account`, which may not be signed in yet
    pub async fn submit(
        &self,
        session: &SessionContext,
        account: &Identity,
    ) -> Result<(UserProfile, Notice)> {
        let profile = self.draft().into_profile(Some(account.email.clone()))?;
        let saved = session.save_profile_as(account, profile).await?;
        Ok((saved, Notice::success("Your profile has been saved!")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_splits_skills() {
        let form = OnboardingForm {
            name: "Ada".to_string(),
            skills_to_teach: " guitar, cooking,, Guitar ".to_string(),
            skills_to_learn: String::new(),
            ..Default::default()
        };
        let draft = form.draft();
        assert_eq!(draft.skills_to_teach.as_slice(), ["guitar", "cooking"]);
        assert!(draft.skills_to_learn.is_empty());
    }
}
