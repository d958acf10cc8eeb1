//! Home: topics, featured users and the signed-in user's achievements

use crate::services::{directory, favorites, ratings, topics};
use crate::Result;
use serde::Serialize;
use skillswap_core::{FavoriteSet, RatingSummary, Topic, UserId, UserRecord};
use skillswap_session::SessionContext;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Counters shown for the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Achievements {
    pub skills_to_teach: usize,
    pub skills_to_learn: usize,
    pub ratings_count: usize,
    /// One decimal, `"0.0"` when unrated
    pub average_rating: String,
}

pub struct HomeScreen {
    session: Arc<SessionContext>,
    users: Vec<UserRecord>,
    topics: Vec<Topic>,
    summaries: BTreeMap<UserId, RatingSummary>,
    favorites: FavoriteSet,
    search: String,
}

impl HomeScreen {
    pub fn new(session: Arc<SessionContext>) -> Self {
        HomeScreen {
            session,
            users: Vec::new(),
            topics: Vec::new(),
            summaries: BTreeMap::new(),
            favorites: FavoriteSet::new(),
            search: String::new(),
        }
    }

    /// Fetch users, topics, ratings and favorites
    pub async fn load(&mut self) -> Result<()> {
        let store = self.session.store().clone();
        let (users, topics, summaries) = tokio::try_join!(
            directory::list_users(store.as_ref()),
            topics::list_topics(store.as_ref()),
            ratings::all_summaries(store.as_ref()),
        )?;
        self.favorites = match self.session.current_uid() {
            Some(uid) => favorites::fetch_favorites(store.as_ref(), &uid).await?,
            None => FavoriteSet::new(),
        };
        debug!(
            "Home loaded {} users, {} topics, {} rated",
            users.len(),
            topics.len(),
            summaries.len()
        );
        self.users = users;
        self.topics = topics;
        self.summaries = summaries;
        Ok(())
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Topics matching the search text
    pub fn topics(&self) -> Vec<&Topic> {
        topics::search(&self.topics, &self.search)
    }

    /// Everyone except the signed-in user
    pub fn featured(&self) -> Vec<&UserRecord> {
        let me = self.session.current_uid();
        self.users
            .iter()
            .filter(|u| Some(&u.id) != me.as_ref())
            .collect()
    }

    /// The full directory, signed-in user included
    pub fn all_teachers(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn summary_for(&self, uid: &UserId) -> RatingSummary {
        self.summaries.get(uid).copied().unwrap_or_default()
    }

    /// `None` when signed out or the user has no profile in the directory
    pub fn achievements(&self) -> Option<Achievements> {
        let me = self.session.current_uid()?;
        let record = self.users.iter().find(|u| u.id == me)?;
        let summary = self.summary_for(&me);
        Some(Achievements {
            skills_to_teach: record.profile.skills_to_teach.len(),
            skills_to_learn: record.profile.skills_to_learn.len(),
            ratings_count: summary.count,
            average_rating: summary.display_average(),
        })
    }

    pub fn is_favorite(&self, teacher: &UserId) -> bool {
        self.favorites.contains(teacher)
    }

    pub async fn toggle_favorite(&mut self, teacher: &UserId) -> Result<bool> {
        let now = favorites::toggle_favorite(&self.session, teacher).await?;
        if self.favorites.contains(teacher) != now {
            self.favorites.toggle(teacher);
        }
        Ok(now)
    }
}
