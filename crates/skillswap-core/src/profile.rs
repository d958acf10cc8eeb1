//! User profiles as stored under `users/{uid}`

use crate::skills::SkillList;
use crate::{CoreError, Result, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Profile document
///
/// Field names follow the stored JSON. Older onboarding builds wrote the
/// avatar as `photoURL`, which is still accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub bio: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, alias = "photoURL", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub skills_to_teach: SkillList,

    #[serde(default)]
    pub skills_to_learn: SkillList,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<String>,
}

impl UserProfile {
    /// Profile shown when the owner has none stored yet
    pub fn placeholder(email: Option<String>) -> Self {
        UserProfile {
            name: "No Name".to_string(),
            bio: "No bio provided.".to_string(),
            email,
            ..Default::default()
        }
    }

    /// Avatar reference, ignoring empty strings
    pub fn avatar(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.is_empty())
    }

    pub fn teaches(&self, skill: &str) -> bool {
        self.skills_to_teach.contains_ignore_case(skill)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::MissingName);
        }
        Ok(())
    }
}

/// A profile together with the id it is stored under
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub profile: UserProfile,
}

impl UserRecord {
    /// Read every entry of a `users` snapshot
    ///
    /// Entries whose key is not a valid id or whose body is not an object are
    /// skipped. Output is ordered by id.
    pub fn list_from_value(value: Option<&Value>) -> Vec<UserRecord> {
        let Some(Value::Object(map)) = value else {
            return Vec::new();
        };

        let mut records: Vec<UserRecord> = map
            .iter()
            .filter_map(|(key, body)| {
                let id = UserId::new(key.as_str()).ok()?;
                match serde_json::from_value::<UserProfile>(body.clone()) {
                    Ok(profile) if body.is_object() => Some(UserRecord { id, profile }),
                    Ok(_) => {
                        warn!("Skipping user {}: document is not an object", key);
                        None
                    }
                    Err(e) => {
                        warn!("Skipping user {}: {}", key, e);
                        None
                    }
                }
            })
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

/// Editable form state for a profile
///
/// Used by onboarding and the profile editor; the name is trimmed and
/// required, skill lists are already de-duplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub name: String,
    pub bio: String,
    pub image: Option<String>,
    pub skills_to_teach: SkillList,
    pub skills_to_learn: SkillList,
}

impl ProfileDraft {
    pub fn from_profile(profile: &UserProfile) -> Self {
        ProfileDraft {
            name: profile.name.clone(),
            bio: profile.bio.clone(),
            image: profile.image.clone(),
            skills_to_teach: profile.skills_to_teach.clone(),
            skills_to_learn: profile.skills_to_learn.clone(),
        }
    }

    /// Validate and turn the draft into a profile document
    pub fn into_profile(self, email: Option<String>) -> Result<UserProfile> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::MissingName);
        }
        Ok(UserProfile {
            name,
            bio: self.bio.trim().to_string(),
            email,
            image: self.image.filter(|s| !s.is_empty()),
            skills_to_teach: self.skills_to_teach,
            skills_to_learn: self.skills_to_learn,
            certifications: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_wire_format() {
        let profile = UserProfile {
            name: "Ada".to_string(),
            bio: "Engines".to_string(),
            email: Some("ada@example.com".to_string()),
            image: None,
            skills_to_teach: SkillList::from_entries(["math"]),
            skills_to_learn: SkillList::new(),
            certifications: None,
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Ada",
                "bio": "Engines",
                "email": "ada@example.com",
                "skillsToTeach": ["math"],
                "skillsToLearn": []
            })
        );
    }

    #[test]
    fn test_profile_accepts_legacy_photo_key() {
        let profile: UserProfile = serde_json::from_value(json!({
            "name": "Bo",
            "photoURL": "file:///avatar.png"
        }))
        .unwrap();
        assert_eq!(profile.avatar(), Some("file:///avatar.png"));
        assert!(profile.skills_to_teach.is_empty());
    }

    #[test]
    fn test_list_from_value_skips_bad_entries() {
        let users = json!({
            "u2": {"name": "Two"},
            "u1": {"name": "One", "skillsToTeach": ["Go"]},
            "u3": "not an object"
        });
        let records = UserRecord::list_from_value(Some(&users));
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert!(records[0].profile.teaches("go"));

        assert!(UserRecord::list_from_value(None).is_empty());
    }

    #[test]
    fn test_draft_requires_name() {
        let draft = ProfileDraft {
            name: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.into_profile(None), Err(CoreError::MissingName));

        let draft = ProfileDraft {
            name: " Cy ".to_string(),
            bio: " hi ".to_string(),
            image: Some(String::new()),
            ..Default::default()
        };
        let profile = draft.into_profile(None).unwrap();
        assert_eq!(profile.name, "Cy");
        assert_eq!(profile.bio, "hi");
        assert_eq!(profile.image, None);
    }

    #[test]
    fn test_placeholder() {
        let profile = UserProfile::placeholder(Some("x@y.z".to_string()));
        assert_eq!(profile.name, "No Name");
        assert_eq!(profile.bio, "No bio provided.");
        assert!(profile.skills_to_learn.is_empty());
    }
}
