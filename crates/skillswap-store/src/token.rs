//! Shared credential for authenticated store requests

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// ID token attached to REST requests as `?auth=`
///
/// Cloned handles share one slot: the session writes it on login and
/// clears it on logout, the store reads it per request.
#[derive(Clone, Default)]
pub struct AuthToken(Arc<RwLock<Option<String>>>);

impl AuthToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().clone()
    }

    /// Store a new token, returning the previous one
    pub fn replace(&self, token: Option<String>) -> Option<String> {
        std::mem::replace(&mut *self.0.write(), token)
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    pub fn is_set(&self) -> bool {
        self.0.read().is_some()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "<set>" } else { "<unset>" };
        f.debug_tuple("AuthToken").field(&state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_slot() {
        let token = AuthToken::new();
        let handle = token.clone();
        assert_eq!(handle.replace(Some("abc".to_string())), None);
        assert_eq!(token.get().as_deref(), Some("abc"));
        assert_eq!(format!("{:?}", token), "AuthToken(\"<set>\")");
        token.clear();
        assert!(!handle.is_set());
    }
}
