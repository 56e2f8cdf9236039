//! Session tokens and the identity they resolve to.
//!
//! A session is a random token stored in the Sessions namespace with a
//! 28-day TTL; its value is the user's Users key (`"<username>:<userId>"`).
//! Each login mints an independent token, and the store's TTL is the only
//! expiry mechanism.

use tower_cookies::Cookie;
use tower_cookies::cookie::{SameSite, time::Duration};

use crate::constants::{ERR_AUTH_REQUIRED, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::error::{AppError, Result};
use crate::keys;
use crate::models::SelfView;
use crate::security::random_id;
use crate::store::{PutOptions, Store};

/// The caller behind a valid session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    /// Raw token, needed to end or rotate the session
    pub session_id: String,
}

impl Identity {
    /// Key of this user's entry in the Users namespace
    pub fn record_key(&self) -> String {
        keys::user_record_key(&self.username, &self.user_id)
    }

    pub fn view(&self) -> SelfView {
        SelfView {
            id: self.user_id.clone(),
            username: self.username.clone(),
        }
    }
}

/// A freshly minted session and the user it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub token: String,
    pub user: SelfView,
}

/// Mint a token bound to a Users key
pub fn create_session(store: &Store, record_key: &str) -> Result<NewSession> {
    let token = random_id();
    store
        .sessions
        .put(&token, record_key, PutOptions::with_ttl(SESSION_TTL_SECS))?;

    Ok(NewSession {
        token,
        user: SelfView {
            id: keys::id_from_key(record_key).to_string(),
            username: keys::username_from_key(record_key).to_string(),
        },
    })
}

pub fn destroy_session(store: &Store, token: &str) -> Result<()> {
    store.sessions.delete(token)?;
    Ok(())
}

/// Resolve a session token to the caller's identity.
///
/// Missing, unknown and expired tokens are indistinguishable to the caller.
pub fn resolve_identity(store: &Store, token: Option<&str>) -> Result<Identity> {
    let token = match token {
        Some(token) if !token.is_empty() => token,
        _ => return Err(AppError::Unauthorized(ERR_AUTH_REQUIRED.to_string())),
    };

    let Some(record_key) = store.sessions.get(token)? else {
        tracing::debug!("Rejected unknown or expired session");
        store.sessions.delete(token)?;
        return Err(AppError::Unauthorized(ERR_AUTH_REQUIRED.to_string()));
    };

    Ok(Identity {
        user_id: keys::id_from_key(&record_key).to_string(),
        username: keys::username_from_key(&record_key).to_string(),
        session_id: token.to_string(),
    })
}

// =============================================================================
// Cookies
// =============================================================================

/// Cookie carrying a new session token, living as long as the session
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Session cookie to hand to `Cookies::remove`; attributes match
/// [`session_cookie`] so the browser drops the same cookie
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_resolve_session() {
        let store = Store::in_memory();
        let record_key = keys::user_record_key("alice", &random_id());

        let session = create_session(&store, &record_key).unwrap();
        assert_eq!(session.token.len(), 32);
        assert_eq!(session.user.username, "alice");

        let identity = resolve_identity(&store, Some(&session.token)).unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.user_id, session.user.id);
        assert_eq!(identity.session_id, session.token);
        assert_eq!(identity.record_key(), record_key);
    }

    #[test]
    fn test_each_login_is_independent() {
        let store = Store::in_memory();
        let record_key = keys::user_record_key("alice", &random_id());

        let first = create_session(&store, &record_key).unwrap();
        let second = create_session(&store, &record_key).unwrap();
        assert_ne!(first.token, second.token);

        destroy_session(&store, &first.token).unwrap();
        assert!(resolve_identity(&store, Some(&first.token)).is_err());
        assert!(resolve_identity(&store, Some(&second.token)).is_ok());
    }

    #[test]
    fn test_resolve_rejects_missing_and_unknown_tokens() {
        let store = Store::in_memory();

        for token in [None, Some(""), Some("deadbeef")] {
            let err = resolve_identity(&store, token).unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(ref msg) if msg == ERR_AUTH_REQUIRED));
        }
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(2_419_200)));

        let header = cookie.to_string();
        assert!(header.starts_with("primary=abc;"));
        assert!(header.contains("Max-Age=2419200"));

        let removal = removal_cookie();
        assert_eq!(removal.name(), SESSION_COOKIE);
        assert_eq!(removal.path(), Some("/"));
    }
}
