//! Favorites: the signed-in user's favorite teachers, kept live

use super::skill_preview;
use crate::services::{directory, favorites, require_login};
use crate::Result;
use serde::Serialize;
use skillswap_core::{FavoriteSet, UserId, UserRecord};
use skillswap_session::SessionContext;
use skillswap_store::Subscription;

/// One favorite teacher as listed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteCard {
    pub id: UserId,
    pub name: String,
    pub image: Option<String>,
    pub teaches: Vec<String>,
    pub teaches_more: usize,
    pub learns: Vec<String>,
    pub learns_more: usize,
}

impl FavoriteCard {
    pub fn from_record(record: &UserRecord) -> Self {
        let (teaches, teaches_more) = skill_preview(&record.profile.skills_to_teach);
        let (learns, learns_more) = skill_preview(&record.profile.skills_to_learn);
        FavoriteCard {
            id: record.id.clone(),
            name: record.profile.name.clone(),
            image: record.profile.avatar().map(str::to_string),
            teaches,
            teaches_more,
            learns,
            learns_more,
        }
    }
}

/// Favorited users that still have a profile, in directory order
pub fn join(users: &[UserRecord], favorites: &FavoriteSet) -> Vec<FavoriteCard> {
    users
        .iter()
        .filter(|u| favorites.contains(&u.id))
        .map(FavoriteCard::from_record)
        .collect()
}

/// Join of the users and favorites subscriptions
///
/// Yields a new list whenever either side changes, once both have reported.
pub struct FavoritesFeed {
    users_sub: Subscription,
    favorites_sub: Subscription,
    users: Option<Vec<UserRecord>>,
    favorites: Option<FavoriteSet>,
}

impl FavoritesFeed {
    pub fn open(session: &SessionContext) -> Result<Self> {
        let me = require_login(session, "view favorites")?;
        let store = session.store().as_ref();
        Ok(FavoritesFeed {
            users_sub: directory::subscribe_users(store),
            favorites_sub: favorites::subscribe_favorites(store, &me.uid),
            users: None,
            favorites: None,
        })
    }

    /// Next version of the list; `None` once a subscription has closed
    pub async fn next(&mut self) -> Option<Vec<FavoriteCard>> {
        loop {
            tokio::select! {
                snapshot = self.users_sub.next() => {
                    let snapshot = snapshot?;
                    self.users = Some(UserRecord::list_from_value(snapshot.value()));
                }
                snapshot = self.favorites_sub.next() => {
                    let snapshot = snapshot?;
                    self.favorites = Some(FavoriteSet::from_value(snapshot.value()));
                }
            }
            if let (Some(users), Some(favorites)) = (&self.users, &self.favorites) {
                return Some(join(users, favorites));
            }
        }
    }
}
