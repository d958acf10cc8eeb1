//! Rating aggregation and submission

use super::require_login;
use crate::Result;
use serde_json::Value;
use skillswap_core::{Rating, RatingScore, RatingSet, RatingSummary, UserId};
use skillswap_session::SessionContext;
use skillswap_store::{RemoteStore, RemoteStoreExt, StorePath};
use std::collections::BTreeMap;
use tracing::info;

pub async fn fetch_ratings(store: &dyn RemoteStore, teacher: &UserId) -> Result<RatingSet> {
    let value = store.get(&StorePath::ratings(teacher)).await?;
    Ok(RatingSet::from_value(value.as_ref()))
}

/// Mean score of a teacher, zero when nobody has rated them
pub async fn rating_summary(store: &dyn RemoteStore, teacher: &UserId) -> Result<RatingSummary> {
    Ok(fetch_ratings(store, teacher).await?.summary())
}

/// Summaries for every rated teacher, read in one request
pub async fn all_summaries(store: &dyn RemoteStore) -> Result<BTreeMap<UserId, RatingSummary>> {
    let Some(Value::Object(teachers)) = store.get(&StorePath::all_ratings()).await? else {
        return Ok(BTreeMap::new());
    };
    Ok(teachers
        .iter()
        .filter_map(|(key, ratings)| {
            let teacher = UserId::new(key.as_str()).ok()?;
            Some((teacher, RatingSet::from_value(Some(ratings)).summary()))
        })
        .collect())
}

/// Record the signed-in user's rating of `teacher`, replacing any earlier one
pub async fn submit_rating(
    session: &SessionContext,
    teacher: &UserId,
    score: RatingScore,
    comment: &str,
) -> Result<Rating> {
    let rater = require_login(session, "rate")?;
    let rating = Rating::new(score, comment);
    session
        .store()
        .set_as(&StorePath::rating(teacher, &rater.uid), &rating)
        .await?;
    info!("{} rated {} with {}", rater.uid, teacher, score);
    Ok(rating)
}
