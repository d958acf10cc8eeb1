//! Live lists of the users around one skill

use crate::services::directory;
use skillswap_core::{UserId, UserRecord};
use skillswap_session::SessionContext;
use skillswap_store::Subscription;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillMatch {
    /// Users teaching the skill (any case), the viewer excluded
    Teachers { exclude: Option<UserId> },
    /// Users teaching or learning exactly the skill
    Anyone,
}

pub struct SkillFeed {
    skill: String,
    mode: SkillMatch,
    users: Subscription,
}

impl SkillFeed {
    pub fn teachers(session: &SessionContext, skill: impl Into<String>) -> Self {
        let mode = SkillMatch::Teachers {
            exclude: session.current_uid(),
        };
        Self::open(session, skill.into(), mode)
    }

    pub fn users(session: &SessionContext, skill: impl Into<String>) -> Self {
        Self::open(session, skill.into(), SkillMatch::Anyone)
    }

    fn open(session: &SessionContext, skill: String, mode: SkillMatch) -> Self {
        SkillFeed {
            skill,
            mode,
            users: directory::subscribe_users(session.store().as_ref()),
        }
    }

    pub fn skill(&self) -> &str {
        &self.skill
    }

    pub fn filter(&self, users: &[UserRecord]) -> Vec<UserRecord> {
        let matched = match &self.mode {
            SkillMatch::Teachers { exclude } => {
                directory::teachers_of(users, &self.skill, exclude.as_ref())
            }
            SkillMatch::Anyone => directory::users_with_skill(users, &self.skill),
        };
        matched.into_iter().cloned().collect()
    }

    /// Matching users after the next change; `None` once closed
    pub async fn next(&mut self) -> Option<Vec<UserRecord>> {
        let snapshot = self.users.next().await?;
        let users = UserRecord::list_from_value(snapshot.value());
        Some(self.filter(&users))
    }
}
