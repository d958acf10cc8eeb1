//! Session context
//!
//! [`SessionContext`] owns the login state and publishes it over a
//! `watch` channel. On start it restores the cached identity immediately,
//! then checks it against the auth service:
//! - same account: tokens are refreshed
//! - different account: the cached profile is dropped and reloaded
//! - session revoked: everything local is cleared
//! - service unreachable: the cached session is kept

use crate::cache::{CachedProfile, LocalCache, LocalCacheExt, PROFILE_KEY, USER_KEY};
use crate::{Result, SessionError};
use serde_json::{json, Map};
use skillswap_core::{LoginForm, SignupForm, SkillList, Topic, UserId, UserProfile};
use skillswap_store::{AuthProvider, AuthToken, Identity, RemoteStore, RemoteStoreExt, StorePath};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginStatus {
    /// Not yet determined
    #[default]
    Unknown,
    LoggedIn,
    LoggedOut,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub status: LoginStatus,
    pub identity: Option<Identity>,
    pub profile: Option<UserProfile>,
    pub loading: bool,
}

impl SessionState {
    pub fn uid(&self) -> Option<&UserId> {
        self.identity.as_ref().map(|i| &i.uid)
    }
}

/// Record every teach skill under `topics/`
///
/// All topics go out in one merge; an existing topic keeps its key and takes
/// the latest spelling.
pub async fn register_topics(store: &dyn RemoteStore, skills: &SkillList) -> Result<usize> {
    let mut fields = Map::new();
    for skill in skills {
        fields.insert(Topic::key_for(skill), json!({ "name": skill }));
    }
    if fields.is_empty() {
        return Ok(0);
    }
    let count = fields.len();
    store.update(&StorePath::topics(), fields).await?;
    debug!("Registered {} topics", count);
    Ok(count)
}

pub struct SessionContext {
    store: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
    cache: Arc<dyn LocalCache>,
    token: AuthToken,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    /// `token` must be the same handle the store reads its credentials from
    pub fn new(
        store: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        cache: Arc<dyn LocalCache>,
        token: AuthToken,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        SessionContext {
            store,
            auth,
            cache,
            token,
            state,
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn status(&self) -> LoginStatus {
        self.state.borrow().status
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn current_uid(&self) -> Option<UserId> {
        self.state.borrow().uid().cloned()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.state.borrow().profile.clone()
    }

    pub fn require_identity(&self) -> Result<Identity> {
        self.identity().ok_or(SessionError::NotLoggedIn)
    }

    /// Restore the cached session, then reconcile it with the auth service
    pub async fn initialize(&self) -> Result<LoginStatus> {
        self.state.send_modify(|s| s.loading = true);

        let cached: Option<Identity> = match self.cache.get_json(USER_KEY).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Discarding unreadable cached session: {}", e);
                self.cache.remove(USER_KEY).await?;
                None
            }
        };

        let Some(cached) = cached else {
            self.state.send_modify(|s| {
                *s = SessionState {
                    status: LoginStatus::LoggedOut,
                    ..Default::default()
                }
            });
            return Ok(LoginStatus::LoggedOut);
        };

        info!("Restored session for {}", cached.email);
        self.adopt(cached.clone());
        if let Err(e) = self.load_profile().await {
            warn!("Could not load profile: {}", e);
        }

        let reconciled = self.reconcile(&cached).await;
        self.state.send_modify(|s| s.loading = false);
        reconciled?;
        Ok(self.status())
    }

    async fn reconcile(&self, cached: &Identity) -> Result<()> {
        match self.auth.refresh(cached).await {
            Ok(fresh) if fresh.uid == cached.uid => {
                debug!("Session for {} is still valid", fresh.uid);
                self.persist_identity(&fresh).await;
                self.adopt(fresh);
            }
            Ok(fresh) => {
                info!("Auth service reports {} instead of {}", fresh.uid, cached.uid);
                if let Err(e) = self.cache.remove(PROFILE_KEY).await {
                    warn!("Could not drop cached profile: {}", e);
                }
                self.persist_identity(&fresh).await;
                self.adopt(fresh);
                self.state.send_modify(|s| s.profile = None);
                if let Err(e) = self.load_profile().await {
                    warn!("Could not load profile: {}", e);
                }
            }
            Err(e) if e.is_session_invalid() => {
                info!("Cached session is no longer valid: {}", e);
                self.clear_local().await?;
            }
            Err(e) => {
                warn!("Could not reach auth service, keeping cached session: {}", e);
            }
        }
        Ok(())
    }

    pub async fn sign_in(&self, form: &LoginForm) -> Result<Identity> {
        form.validate()?;
        let identity = self.auth.sign_in(form.email.trim(), &form.password).await?;
        if !identity.email_verified {
            info!("Refusing login for unverified {}", identity.email);
            return Err(SessionError::EmailNotVerified);
        }

        let previous = self.current_uid();
        self.persist_identity(&identity).await;
        self.adopt(identity.clone());
        if previous.as_ref() != Some(&identity.uid) {
            self.state.send_modify(|s| s.profile = None);
        }
        if let Err(e) = self.load_profile().await {
            warn!("Could not load profile: {}", e);
        }
        info!("Logged in as {}", identity.email);
        Ok(identity)
    }

    /// Create an account and send its verification email
    ///
    /// The session stays logged out; the returned identity can be used to
    /// write the new profile with [`SessionContext::save_profile_as`].
    pub async fn sign_up(&self, form: &SignupForm) -> Result<Identity> {
        form.validate()?;
        let identity = self.auth.sign_up(form.email.trim(), &form.password).await?;
        self.auth.send_email_verification(&identity).await?;
        info!("Created account {}, verification pending", identity.email);
        Ok(identity)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.clear_local().await?;
        info!("Logged out");
        Ok(())
    }

    /// Current user's profile, cache first
    pub async fn load_profile(&self) -> Result<Option<UserProfile>> {
        let identity = self.require_identity()?;
        if let Some(profile) = self.cached_profile_for(&identity.uid).await {
            self.state.send_modify(|s| s.profile = Some(profile.clone()));
            return Ok(Some(profile));
        }
        self.fetch_profile(&identity.uid).await
    }

    /// Current user's profile, remote first
    ///
    /// Falls back to the cache when the remote has no document.
    pub async fn refresh_profile(&self) -> Result<Option<UserProfile>> {
        let identity = self.require_identity()?;
        match self.fetch_profile(&identity.uid).await? {
            Some(profile) => Ok(Some(profile)),
            None => Ok(self.cached_profile_for(&identity.uid).await),
        }
    }

    /// Cached profile of the signed-in user, without touching the network
    pub async fn cached_profile(&self) -> Option<UserProfile> {
        let uid = self.current_uid()?;
        self.cached_profile_for(&uid).await
    }

    pub async fn save_profile(&self, profile: UserProfile) -> Result<UserProfile> {
        let identity = self.require_identity()?;
        self.save_profile_as(&identity, profile).await
    }

    /// Write `profile` for `identity`, which need not be signed in
    pub async fn save_profile_as(
        &self,
        identity: &Identity,
        mut profile: UserProfile,
    ) -> Result<UserProfile> {
        profile.validate()?;
        profile.name = profile.name.trim().to_string();
        profile.email = Some(identity.email.clone());

        let is_current = self.current_uid().as_ref() == Some(&identity.uid);
        let previous_token = if is_current {
            None
        } else {
            Some(self.token.replace(Some(identity.id_token.clone())))
        };

        let written = self.write_profile(&identity.uid, &profile).await;
        if let Some(previous) = previous_token {
            self.token.replace(previous);
        }
        written?;

        info!("Saved profile for {}", identity.uid);
        if is_current {
            self.cache_profile(&identity.uid, &profile).await;
            self.state.send_modify(|s| s.profile = Some(profile.clone()));
        }
        Ok(profile)
    }

    async fn write_profile(&self, uid: &UserId, profile: &UserProfile) -> Result<()> {
        self.store.set_as(&StorePath::user(uid), profile).await?;
        register_topics(self.store.as_ref(), &profile.skills_to_teach).await?;
        Ok(())
    }

    async fn fetch_profile(&self, uid: &UserId) -> Result<Option<UserProfile>> {
        let profile: Option<UserProfile> = self.store.get_as(&StorePath::user(uid)).await?;
        if let Some(profile) = &profile {
            self.cache_profile(uid, profile).await;
            self.state.send_modify(|s| {
                if s.uid() == Some(uid) {
                    s.profile = Some(profile.clone());
                }
            });
        }
        Ok(profile)
    }

    async fn cached_profile_for(&self, uid: &UserId) -> Option<UserProfile> {
        match self.cache.get_json::<CachedProfile>(PROFILE_KEY).await {
            Ok(Some(cached)) if &cached.uid == uid => Some(cached.profile),
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring unreadable cached profile: {}", e);
                None
            }
        }
    }

    async fn cache_profile(&self, uid: &UserId, profile: &UserProfile) {
        let cached = CachedProfile {
            uid: uid.clone(),
            profile: profile.clone(),
        };
        if let Err(e) = self.cache.set_json(PROFILE_KEY, &cached).await {
            warn!("Could not cache profile: {}", e);
        }
    }

    async fn persist_identity(&self, identity: &Identity) {
        if let Err(e) = self.cache.set_json(USER_KEY, identity).await {
            warn!("Could not cache session: {}", e);
        }
    }

    fn adopt(&self, identity: Identity) {
        self.token.replace(Some(identity.id_token.clone()));
        self.state.send_modify(|s| {
            s.status = LoginStatus::LoggedIn;
            s.identity = Some(identity);
        });
    }

    async fn clear_local(&self) -> Result<()> {
        self.token.clear();
        self.state.send_modify(|s| {
            *s = SessionState {
                status: LoginStatus::LoggedOut,
                ..Default::default()
            }
        });
        self.cache.remove(USER_KEY).await?;
        self.cache.remove(PROFILE_KEY).await?;
        Ok(())
    }
}
