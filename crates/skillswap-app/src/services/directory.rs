//! The user directory under `users/`

use crate::Result;
use skillswap_core::{UserId, UserProfile, UserRecord};
use skillswap_store::{RemoteStore, RemoteStoreExt, StorePath, Subscription};

pub async fn list_users(store: &dyn RemoteStore) -> Result<Vec<UserRecord>> {
    let value = store.get(&StorePath::users()).await?;
    Ok(UserRecord::list_from_value(value.as_ref()))
}

pub async fn get_user(store: &dyn RemoteStore, uid: &UserId) -> Result<Option<UserProfile>> {
    Ok(store.get_as(&StorePath::user(uid)).await?)
}

pub fn subscribe_users(store: &dyn RemoteStore) -> Subscription {
    store.subscribe(&StorePath::users())
}

/// Users who teach `skill` (any case), leaving out `exclude`
pub fn teachers_of<'a>(
    users: &'a [UserRecord],
    skill: &str,
    exclude: Option<&UserId>,
) -> Vec<&'a UserRecord> {
    users
        .iter()
        .filter(|u| Some(&u.id) != exclude)
        .filter(|u| u.profile.teaches(skill))
        .collect()
}

/// Users who teach or want to learn exactly `skill`
pub fn users_with_skill<'a>(users: &'a [UserRecord], skill: &str) -> Vec<&'a UserRecord> {
    users
        .iter()
        .filter(|u| {
            u.profile.skills_to_teach.contains(skill) || u.profile.skills_to_learn.contains(skill)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_core::SkillList;

    fn record(id: &str, teach: &[&str], learn: &[&str]) -> UserRecord {
        UserRecord {
            id: UserId::new(id).unwrap(),
            profile: UserProfile {
                name: id.to_string(),
                skills_to_teach: SkillList::from_entries(teach),
                skills_to_learn: SkillList::from_entries(learn),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_teachers_ignore_case_and_self() {
        let users = vec![
            record("a", &["Guitar"], &[]),
            record("b", &["guitar"], &[]),
            record("c", &["piano"], &["guitar"]),
        ];
        let me = UserId::new("b").unwrap();
        let found: Vec<&str> = teachers_of(&users, "GUITAR", Some(&me))
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(found, vec!["a"]);
    }

    #[test]
    fn test_users_with_skill_is_exact() {
        let users = vec![
            record("a", &["Guitar"], &[]),
            record("b", &[], &["guitar"]),
            record("c", &["guitar"], &[]),
        ];
        let found: Vec<&str> = users_with_skill(&users, "guitar")
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(found, vec!["b", "c"]);
    }
}
