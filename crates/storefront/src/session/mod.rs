//! Session store: the authenticated identity and its persisted token.
//!
//! The in-memory identity and the persisted cookie always agree: `login`
//! writes both, `logout` clears both, and `initialize` drops anything the
//! cookie holds that is absent, malformed, or expired.
//!
//! Session changes are published over a `tokio::sync::watch` channel so the
//! cart store can react without ambient globals.

pub mod cookie;
pub mod token;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use jacaranda_core::{Email, UserId};

use crate::api::types::SessionUser;
pub use cookie::{AUTH_COOKIE_NAME, CookieFile};
pub use token::{TokenClaims, TokenError};

/// Identity of the logged-in user.
///
/// Minimal data kept in memory to identify the session; decoded from the
/// token payload or taken from the login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<SessionUser> for CurrentUser {
    fn from(user: SessionUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    user: Option<CurrentUser>,
    token: Option<SecretString>,
    /// True only until the initial cookie check has run.
    loading: bool,
}

/// Holder of the current authenticated identity.
#[derive(Debug)]
pub struct SessionStore {
    cookie: CookieFile,
    state: RwLock<SessionState>,
    changes: watch::Sender<Option<CurrentUser>>,
}

impl SessionStore {
    /// Create a store persisting through `cookie`. The store starts in the
    /// loading state until [`Self::initialize`] runs.
    #[must_use]
    pub fn new(cookie: CookieFile) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            cookie,
            state: RwLock::new(SessionState {
                user: None,
                token: None,
                loading: true,
            }),
            changes,
        }
    }

    /// Restore identity from the persisted token, if any.
    ///
    /// The decode is advisory only - no signature verification happens
    /// here. A token that fails to decode or has expired is deleted and
    /// leaves the identity empty.
    pub fn initialize(&self) {
        let restored = self.cookie.load().and_then(|raw| {
            match token::decode(&raw, Utc::now()) {
                Ok(claims) => Some((claims, raw)),
                Err(error) => {
                    tracing::warn!(%error, "Discarding persisted token");
                    self.cookie.delete();
                    None
                }
            }
        });

        let user = {
            let mut state = self.write_state();
            state.loading = false;
            match restored {
                Some((claims, raw)) => {
                    let user = CurrentUser {
                        id: claims.id,
                        name: claims.name,
                        email: claims.email,
                    };
                    state.user = Some(user.clone());
                    state.token = Some(SecretString::from(raw));
                    Some(user)
                }
                None => {
                    state.user = None;
                    state.token = None;
                    None
                }
            }
        };

        self.changes.send_replace(user);
    }

    /// Set the identity and persist the token with a 7-day window.
    ///
    /// Always succeeds from the caller's perspective; a cookie-file write
    /// failure is logged and costs only persistence across restarts.
    pub fn login(&self, user: CurrentUser, token: SecretString) {
        if let Err(error) = self.cookie.store(token.expose_secret()) {
            tracing::error!(%error, "Failed to persist auth cookie");
        }

        {
            let mut state = self.write_state();
            state.user = Some(user.clone());
            state.token = Some(token);
            state.loading = false;
        }

        self.changes.send_replace(Some(user));
    }

    /// Clear the identity and delete the persisted token. Idempotent.
    pub fn logout(&self) {
        self.cookie.delete();

        {
            let mut state = self.write_state();
            state.user = None;
            state.token = None;
        }

        self.changes.send_replace(None);
    }

    /// The current identity, if a session is active.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.read_state().user.clone()
    }

    /// The bearer token attached to authenticated requests.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read_state().token.clone()
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().user.is_some()
    }

    /// True only while the initial cookie check has not yet run.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.changes.subscribe()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(CookieFile::new(dir.path().join("cookie")));
        (dir, store)
    }

    fn token_for(name: &str, exp_offset_ms: i64) -> String {
        BASE64.encode(
            serde_json::json!({
                "id": "u-1",
                "name": name,
                "email": "ana@example.com",
                "exp": Utc::now().timestamp_millis() + exp_offset_ms,
            })
            .to_string(),
        )
    }

    fn ana() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u-1"),
            name: "Ana".to_string(),
            email: Email::parse("ana@example.com").unwrap(),
        }
    }

    #[test]
    fn test_starts_loading_until_initialized() {
        let (_dir, store) = temp_store();
        assert!(store.is_loading());
        store.initialize();
        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_login_persists_and_survives_restart() {
        let (dir, store) = temp_store();
        store.login(ana(), SecretString::from(token_for("Ana", 60_000)));
        assert!(store.is_authenticated());

        // A fresh store over the same cookie file restores the identity
        let restarted = SessionStore::new(CookieFile::new(dir.path().join("cookie")));
        restarted.initialize();
        assert_eq!(restarted.current_user(), Some(ana()));
        assert!(restarted.token().is_some());
    }

    #[test]
    fn test_initialize_drops_expired_token() {
        let (dir, store) = temp_store();
        store.login(ana(), SecretString::from(token_for("Ana", -1)));

        let restarted = SessionStore::new(CookieFile::new(dir.path().join("cookie")));
        restarted.initialize();
        assert_eq!(restarted.current_user(), None);
        assert!(restarted.token().is_none());
        assert!(!dir.path().join("cookie").exists());
    }

    #[test]
    fn test_initialize_drops_malformed_token() {
        let (dir, store) = temp_store();
        store.login(ana(), SecretString::from("not-a-real-token"));

        let restarted = SessionStore::new(CookieFile::new(dir.path().join("cookie")));
        restarted.initialize();
        assert_eq!(restarted.current_user(), None);
        assert!(!dir.path().join("cookie").exists());
    }

    #[test]
    fn test_logout_is_idempotent_and_notifies() {
        let (_dir, store) = temp_store();
        let rx = store.subscribe();

        store.login(ana(), SecretString::from(token_for("Ana", 60_000)));
        assert_eq!(*rx.borrow(), Some(ana()));

        store.logout();
        store.logout();
        assert_eq!(*rx.borrow(), None);
        assert!(store.token().is_none());
    }
}
