//! Favorite teachers, stored as `favorites/{userId}/{teacherId} = teacherId`

use crate::UserId;
use serde_json::Value;
use std::collections::BTreeSet;

/// The set of teachers one user has favorited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet(BTreeSet<UserId>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a `favorites/{userId}` snapshot
    ///
    /// Membership is decided by the child keys; the values only mirror them.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return FavoriteSet::new();
        };
        FavoriteSet(
            map.keys()
                .filter_map(|key| UserId::new(key.as_str()).ok())
                .collect(),
        )
    }

    pub fn contains(&self, teacher: &UserId) -> bool {
        self.0.contains(teacher)
    }

    /// Flip membership, returning whether the teacher is now a favorite
    pub fn toggle(&mut self, teacher: &UserId) -> bool {
        if self.0.remove(teacher) {
            false
        } else {
            self.0.insert(teacher.clone());
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<UserId> for FavoriteSet {
    fn from_iter<T: IntoIterator<Item = UserId>>(iter: T) -> Self {
        FavoriteSet(iter.into_iter().collect())
    }
}
