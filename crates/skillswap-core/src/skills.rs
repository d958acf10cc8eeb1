//! Ordered skill lists
//!
//! A profile carries two of these: the skills a user can teach and the
//! skills they want to learn. Entries are trimmed and never duplicated
//! (compared case-insensitively).

use crate::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Outcome of [`SkillList::add`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillEdit {
    /// The skill was appended
    Added(String),
    /// The input was blank after trimming, nothing changed
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillList(Vec<String>);

impl SkillList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from arbitrary input, trimming entries and dropping
    /// blanks and duplicates while keeping first-seen order
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = SkillList::new();
        for entry in entries {
            // Duplicates are silently dropped here, unlike `add`
            let _ = list.add(entry.as_ref());
        }
        list
    }

    /// Parse a comma-separated input such as `"guitar, cooking,,Go"`
    pub fn parse_csv(input: &str) -> Self {
        Self::from_entries(input.split(','))
    }

    /// Append a skill unless it is blank or already present
    pub fn add(&mut self, raw: &str) -> Result<SkillEdit> {
        let skill = raw.trim();
        if skill.is_empty() {
            return Ok(SkillEdit::Ignored);
        }
        if self.contains_ignore_case(skill) {
            return Err(CoreError::DuplicateSkill(skill.to_string()));
        }
        self.0.push(skill.to_string());
        Ok(SkillEdit::Added(skill.to_string()))
    }

    /// Remove the skill at `index`, returning it
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.iter().any(|s| s == skill)
    }

    pub fn contains_ignore_case(&self, skill: &str) -> bool {
        self.position_ignore_case(skill).is_some()
    }

    /// Index of `skill`, trimmed and compared with Unicode lowercasing
    pub fn position_ignore_case(&self, skill: &str) -> Option<usize> {
        let needle = skill.trim().to_lowercase();
        self.0.iter().position(|s| s.to_lowercase() == needle)
    }

    /// First `limit` entries plus the number of entries left out
    pub fn preview(&self, limit: usize) -> (&[String], usize) {
        let shown = limit.min(self.0.len());
        (&self.0[..shown], self.0.len() - shown)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a SkillList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for SkillList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(SkillList::from_value(&value))
    }
}

impl SkillList {
    /// Read a list the way the remote store may hand it back
    ///
    /// Arrays are the normal shape. Once an element has been deleted the
    /// store returns a sparse object keyed by index instead. Anything else
    /// reads as an empty list.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::from_entries(items.iter().filter_map(Value::as_str)),
            Value::Object(map) => {
                let mut indexed: Vec<(u64, &str)> = map
                    .iter()
                    .filter_map(|(k, v)| Some((k.parse::<u64>().ok()?, v.as_str()?)))
                    .collect();
                indexed.sort_by_key(|(idx, _)| *idx);
                Self::from_entries(indexed.into_iter().map(|(_, s)| s))
            }
            _ => SkillList::new(),
        }
    }
}
