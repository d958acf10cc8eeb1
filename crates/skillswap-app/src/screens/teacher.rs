//! A teacher's profile page
//!
//! Shows the profile, ratings and favorite flag, and lets the signed-in user
//! rate the teacher, favorite them or ask to connect.

use crate::services::{directory, favorites, notifications, ratings};
use crate::{AppError, Notice, Result};
use skillswap_core::{Rating, RatingScore, RatingSet, RatingSummary, UserId, UserProfile};
use skillswap_session::SessionContext;
use skillswap_store::{Snapshot, StorePath, Subscription};
use std::sync::Arc;
use tracing::debug;

/// Bios longer than this get a "View More" toggle
pub const BIO_PREVIEW_CHARS: usize = 40;

/// Ratings listed before "show all"
pub const RATINGS_PREVIEW: usize = 3;

pub struct TeacherScreen {
    session: Arc<SessionContext>,
    teacher_id: UserId,
    teacher: Option<UserProfile>,
    ratings: RatingSet,
    summary: RatingSummary,
    is_favorite: bool,
    show_full_bio: bool,
    show_all_ratings: bool,
    selected: Option<RatingScore>,
    comment: String,
}

impl TeacherScreen {
    pub fn new(session: Arc<SessionContext>, teacher_id: UserId) -> Self {
        TeacherScreen {
            session,
            teacher_id,
            teacher: None,
            ratings: RatingSet::new(),
            summary: RatingSummary::default(),
            is_favorite: false,
            show_full_bio: false,
            show_all_ratings: false,
            selected: None,
            comment: String::new(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        let store = self.session.store().clone();
        let teacher = directory::get_user(store.as_ref(), &self.teacher_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(self.teacher_id.clone()))?;
        self.teacher = Some(teacher);
        self.reload_ratings().await?;

        self.is_favorite = match self.session.current_uid() {
            Some(me) => favorites::is_favorite(store.as_ref(), &me, &self.teacher_id).await?,
            None => false,
        };
        Ok(())
    }

    async fn reload_ratings(&mut self) -> Result<()> {
        self.ratings = ratings::fetch_ratings(self.session.store().as_ref(), &self.teacher_id).await?;
        self.summary = self.ratings.summary();
        debug!(
            "{} has {} ratings, average {}",
            self.teacher_id,
            self.summary.count,
            self.summary.display_average()
        );
        Ok(())
    }

    pub fn teacher_id(&self) -> &UserId {
        &self.teacher_id
    }

    pub fn teacher(&self) -> Option<&UserProfile> {
        self.teacher.as_ref()
    }

    pub fn summary(&self) -> RatingSummary {
        self.summary
    }

    /// e.g. `"4.5 / 5"`
    pub fn average_label(&self) -> String {
        format!("{} / 5", self.summary.display_average())
    }

    pub fn bio_is_long(&self) -> bool {
        self.teacher
            .as_ref()
            .is_some_and(|t| t.bio.chars().count() > BIO_PREVIEW_CHARS)
    }

    /// The bio, cut to its first [`BIO_PREVIEW_CHARS`] characters while
    /// collapsed
    pub fn bio(&self) -> String {
        let Some(teacher) = &self.teacher else {
            return String::new();
        };
        if self.show_full_bio || !self.bio_is_long() {
            return teacher.bio.clone();
        }
        let cut: String = teacher.bio.chars().take(BIO_PREVIEW_CHARS).collect();
        format!("{}...", cut.trim_end())
    }

    /// "View More" / "View Less", only for long bios
    pub fn bio_toggle_label(&self) -> Option<&'static str> {
        if !self.bio_is_long() {
            return None;
        }
        Some(if self.show_full_bio { "View Less" } else { "View More" })
    }

    pub fn toggle_bio(&mut self) {
        self.show_full_bio = !self.show_full_bio;
    }

    pub fn ratings(&self) -> Vec<(&UserId, &Rating)> {
        let limit = if self.show_all_ratings {
            usize::MAX
        } else {
            RATINGS_PREVIEW
        };
        self.ratings.iter().take(limit).collect()
    }

    /// Ratings hidden by the preview
    pub fn hidden_ratings(&self) -> usize {
        if self.show_all_ratings {
            0
        } else {
            self.ratings.len().saturating_sub(RATINGS_PREVIEW)
        }
    }

    pub fn toggle_all_ratings(&mut self) {
        self.show_all_ratings = !self.show_all_ratings;
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub fn favorite_label(&self) -> &'static str {
        if self.is_favorite {
            "Favorited"
        } else {
            "Add to Favorites"
        }
    }

    /// Live favorite flag; `None` when signed out
    pub fn watch_favorite(&self) -> Option<Subscription> {
        let me = self.session.current_uid()?;
        Some(
            self.session
                .store()
                .subscribe(&StorePath::favorite(&me, &self.teacher_id)),
        )
    }

    pub fn apply_favorite(&mut self, snapshot: &Snapshot) {
        self.is_favorite = snapshot.exists();
    }

    pub async fn toggle_favorite(&mut self) -> Result<bool> {
        self.is_favorite = favorites::toggle_favorite(&self.session, &self.teacher_id).await?;
        Ok(self.is_favorite)
    }

    pub fn select_rating(&mut self, stars: i64) -> Result<()> {
        self.selected = Some(RatingScore::new(stars)?);
        Ok(())
    }

    pub fn selected_rating(&self) -> Option<RatingScore> {
        self.selected
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Submit the selected rating and comment, then clear the form
    pub async fn submit_rating(&mut self) -> Result<Notice> {
        let score = self.selected.ok_or(AppError::NoRatingSelected)?;
        ratings::submit_rating(&self.session, &self.teacher_id, score, &self.comment).await?;
        self.selected = None;
        self.comment.clear();
        self.reload_ratings().await?;
        Ok(Notice::success("Thank you for your rating!"))
    }

    pub async fn connect(&self) -> Result<Notice> {
        notifications::send_connect_request(&self.session, &self.teacher_id).await?;
        Ok(Notice::success("Connection request sent!"))
    }
}
