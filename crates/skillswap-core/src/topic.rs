//! Topics: the registry of skill names offered for browsing
//!
//! Stored as `topics/{key} = { "name": ... }`, where the key is derived from
//! the skill name so the same skill registered by two teachers lands on one
//! entry.

use crate::FORBIDDEN_KEY_CHARS;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(skip)]
    pub id: String,

    #[serde(default)]
    pub name: String,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        Topic {
            id: Self::key_for(&name),
            name,
        }
    }

    /// Store key for a skill name: lowercased, forbidden characters replaced
    pub fn key_for(name: &str) -> String {
        let key: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| {
                if FORBIDDEN_KEY_CHARS.contains(&c) || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        if key.is_empty() {
            "_".to_string()
        } else {
            key
        }
    }

    /// Case-insensitive substring match; an empty search matches everything
    pub fn matches(&self, search: &str) -> bool {
        self.name.to_lowercase().contains(&search.trim().to_lowercase())
    }

    /// Read a `topics` snapshot, ordered by name
    pub fn list_from_value(value: Option<&Value>) -> Vec<Topic> {
        let Some(Value::Object(map)) = value else {
            return Vec::new();
        };
        let mut topics: Vec<Topic> = map
            .iter()
            .filter_map(|(id, body)| {
                let mut topic: Topic = serde_json::from_value(body.clone()).ok()?;
                if topic.name.is_empty() {
                    return None;
                }
                topic.id = id.clone();
                Some(topic)
            })
            .collect();
        topics.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        topics
    }
}
