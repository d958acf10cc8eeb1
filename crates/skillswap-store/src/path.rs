//! Paths into the hierarchical store

use skillswap_core::{validate_key, CoreError, Topic, UserId};
use std::fmt;

/// A validated location such as `ratings/{teacherId}/{raterId}`
///
/// The empty path addresses the root of the database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath(Vec<String>);

impl StorePath {
    pub fn root() -> Self {
        StorePath(Vec::new())
    }

    /// Parse a slash-separated path; empty segments are ignored
    pub fn parse(path: &str) -> Result<Self, CoreError> {
        let mut segments = Vec::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            validate_key(segment)?;
            segments.push(segment.to_string());
        }
        Ok(StorePath(segments))
    }

    pub fn child(&self, key: &str) -> Result<Self, CoreError> {
        validate_key(key)?;
        Ok(self.child_unchecked(key))
    }

    fn child_unchecked(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        StorePath(segments)
    }

    /// Append a relative path such as `a/b`
    pub fn join(&self, relative: &str) -> Result<Self, CoreError> {
        let tail = StorePath::parse(relative)?;
        let mut segments = self.0.clone();
        segments.extend(tail.0);
        Ok(StorePath(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment, `None` for the root
    pub fn key(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(StorePath(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// True when `self` equals `other` or contains it
    pub fn is_ancestor_of(&self, other: &StorePath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// True when a write to one path can change the value read at the other
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }

    pub fn users() -> Self {
        StorePath(vec!["users".to_string()])
    }

    pub fn user(uid: &UserId) -> Self {
        Self::users().child_unchecked(uid.as_str())
    }

    pub fn all_ratings() -> Self {
        StorePath(vec!["ratings".to_string()])
    }

    pub fn ratings(teacher: &UserId) -> Self {
        Self::all_ratings().child_unchecked(teacher.as_str())
    }

    pub fn rating(teacher: &UserId, rater: &UserId) -> Self {
        Self::ratings(teacher).child_unchecked(rater.as_str())
    }

    pub fn favorites(uid: &UserId) -> Self {
        StorePath(vec!["favorites".to_string(), uid.to_string()])
    }

    pub fn favorite(uid: &UserId, teacher: &UserId) -> Self {
        Self::favorites(uid).child_unchecked(teacher.as_str())
    }

    pub fn topics() -> Self {
        StorePath(vec!["topics".to_string()])
    }

    pub fn topic(name: &str) -> Self {
        Self::topics().child_unchecked(&Topic::key_for(name))
    }

    pub fn notifications(uid: &UserId) -> Self {
        StorePath(vec!["notifications".to_string(), uid.to_string()])
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn test_parse() {
        let path = StorePath::parse("/users//u1/").unwrap();
        assert_eq!(path.segments(), &["users".to_string(), "u1".to_string()]);
        assert_eq!(path.to_string(), "users/u1");
        assert!(StorePath::parse("").unwrap().is_root());
        assert!(StorePath::parse("users/a.b").is_err());
    }

    #[test]
    fn test_schema_paths() {
        assert_eq!(StorePath::user(&uid("u1")).to_string(), "users/u1");
        assert_eq!(
            StorePath::rating(&uid("t"), &uid("r")).to_string(),
            "ratings/t/r"
        );
        assert_eq!(
            StorePath::favorite(&uid("u"), &uid("t")).to_string(),
            "favorites/u/t"
        );
        assert_eq!(StorePath::topic("Web.Dev").to_string(), "topics/web_dev");
        assert_eq!(
            StorePath::notifications(&uid("u")).to_string(),
            "notifications/u"
        );
    }

    #[test]
    fn test_relations() {
        let users = StorePath::users();
        let u1 = StorePath::user(&uid("u1"));
        let ratings = StorePath::ratings(&uid("u1"));

        assert!(users.is_ancestor_of(&u1));
        assert!(!u1.is_ancestor_of(&users));
        assert!(u1.overlaps(&users));
        assert!(!u1.overlaps(&ratings));
        assert!(StorePath::root().overlaps(&ratings));
        assert_eq!(u1.parent(), Some(users));
        assert_eq!(u1.key(), Some("u1"));
    }
}
