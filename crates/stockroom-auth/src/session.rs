//! Login sessions.

use crate::error::Result;
use crate::user::{PublicUser, Role, UserAccount};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stockroom_cache::{Cache, Session, SessionId};
use stockroom_commerce::ids::UserId;
use tracing::info;

/// What a session remembers about its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Check if the user has at least the given role.
    pub fn has_permission(&self, required: Role) -> bool {
        self.role.has_permission(required)
    }
}

impl From<&UserAccount> for SessionUser {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.clone(),
            role: account.role,
        }
    }
}

impl From<&PublicUser> for SessionUser {
    fn from(user: &PublicUser) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Cookie-keyed login sessions.
#[derive(Debug, Clone)]
pub struct AuthSessions {
    sessions: Session<SessionUser>,
}

impl AuthSessions {
    pub fn new(cache: Cache, ttl: Duration) -> Self {
        Self {
            sessions: Session::new(cache, ttl),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.sessions.ttl()
    }

    /// Start a session for a user who just logged in.
    pub fn login(&self, user: SessionUser) -> Result<SessionId> {
        let id = self.sessions.create(&user)?;
        info!(user = %user.username, role = %user.role, "user logged in");
        Ok(id)
    }

    /// The user behind a cookie value, if the session is still live.
    pub fn current(&self, cookie: &str) -> Result<Option<SessionUser>> {
        if !SessionId::is_well_formed(cookie) {
            return Ok(None);
        }
        Ok(self.sessions.get(&SessionId::from(cookie))?)
    }

    /// Replace the remembered user, e.g. after an admin renames themselves.
    pub fn refresh(&self, cookie: &str, user: &SessionUser) -> Result<bool> {
        Ok(self.sessions.set(&SessionId::from(cookie), user)?)
    }

    /// Destroy a session. Returns whether it existed.
    pub fn logout(&self, cookie: &str) -> bool {
        self.sessions.delete(&SessionId::from(cookie))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> SessionUser {
        SessionUser {
            id: UserId::new("u1"),
            username: "ada".to_string(),
            role,
        }
    }

    #[test]
    fn test_login_current_logout() {
        let sessions = AuthSessions::new(Cache::new(), Duration::from_secs(60));
        let id = sessions.login(user(Role::Staff)).unwrap();

        assert_eq!(sessions.current(id.as_str()).unwrap(), Some(user(Role::Staff)));
        assert!(sessions.logout(id.as_str()));
        assert_eq!(sessions.current(id.as_str()).unwrap(), None);
    }

    #[test]
    fn test_malformed_cookie_is_anonymous() {
        let sessions = AuthSessions::new(Cache::new(), Duration::from_secs(60));
        assert_eq!(sessions.current("garbage").unwrap(), None);
        assert_eq!(sessions.current("").unwrap(), None);
    }

    #[test]
    fn test_refresh_replaces_user() {
        let sessions = AuthSessions::new(Cache::new(), Duration::from_secs(60));
        let id = sessions.login(user(Role::Customer)).unwrap();
        assert!(sessions.refresh(id.as_str(), &user(Role::Admin)).unwrap());
        assert!(sessions.current(id.as_str()).unwrap().unwrap().is_admin());
    }
}
