//! Session state derived from the persisted bearer token.
//!
//! Nothing here is cached: every query re-reads the token from the
//! [`TokenStore`] and decodes it again. A token that cannot be decoded is
//! reported as [`SessionState::Anonymous`], never as an error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

use crate::store::TokenStore;

mod auto_logout;
mod claims;

pub use self::auto_logout::{ArmOutcome, AutoLogoutScheduler, DEFAULT_LEAD, LogoutTrigger};
pub use self::claims::{Claims, ClaimsError, Subject, UserClaims, decode_claims};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Noun phrase used in access warnings.
    pub fn description(self) -> &'static str {
        match self {
            Role::Admin => "an administrator",
            Role::User => "an unprivileged user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active session decoded from a token.
///
/// Only one role per session is supported: when a token declares several
/// roles, the first one is used. A role string the client does not know
/// leaves `role` empty, which satisfies no role check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Option<Role>,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn is_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    /// Time left until expiry, zero once passed.
    pub fn expires_in(&self, now: OffsetDateTime) -> Duration {
        Duration::try_from(self.expires_at - now).unwrap_or(Duration::ZERO)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Active(Session),
    Expired,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Active(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_role(&self, role: Role) -> bool {
        self.session().is_some_and(|s| s.is_role(role))
    }
}

/// Computes the session state of `token` at `now`.
///
/// `skew` makes a token count as expired that much earlier than its `exp`.
pub fn state_from_token(token: &str, now: OffsetDateTime, skew: Duration) -> SessionState {
    let claims = match decode_claims(token) {
        Ok(c) => c,
        Err(err) => {
            tracing::debug!(error = %err, "undecodable session token; treating as anonymous");
            return SessionState::Anonymous;
        }
    };
    let Ok(expires_at) = OffsetDateTime::from_unix_timestamp(claims.exp) else {
        tracing::debug!(exp = claims.exp, "session token expiry out of range");
        return SessionState::Anonymous;
    };

    // A skew too large to subtract expires every token.
    let deadline = time::Duration::try_from(skew)
        .ok()
        .and_then(|skew| expires_at.checked_sub(skew));
    if deadline.is_none_or(|deadline| deadline <= now) {
        return SessionState::Expired;
    }

    if claims.user_claims.roles.len() > 1 {
        tracing::debug!(
            roles = claims.user_claims.roles.len(),
            "token declares several roles; only the first is used"
        );
    }
    let role = claims
        .user_claims
        .roles
        .first()
        .and_then(|r| Role::parse(r));

    SessionState::Active(Session {
        username: claims.sub.username,
        role,
        expires_at,
    })
}

/// Read-side view of the session over a shared token store.
#[derive(Clone)]
pub struct SessionModel {
    store: Arc<dyn TokenStore>,
    clock_skew: Duration,
}

impl SessionModel {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            clock_skew: Duration::ZERO,
        }
    }

    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    pub fn token(&self) -> Option<String> {
        match self.store.get() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read session token");
                None
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state_at(OffsetDateTime::now_utc())
    }

    pub fn state_at(&self, now: OffsetDateTime) -> SessionState {
        match self.token() {
            Some(token) => state_from_token(&token, now, self.clock_skew),
            None => SessionState::Anonymous,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.state().is_active()
    }

    pub fn is_role(&self, role: Role) -> bool {
        self.state().is_role(role)
    }

    pub fn role(&self) -> Option<Role> {
        self.state().session().and_then(|s| s.role)
    }

    pub fn username(&self) -> Option<String> {
        self.state().session().map(|s| s.username.clone())
    }

    pub fn expires_in(&self) -> Option<Duration> {
        let now = OffsetDateTime::now_utc();
        self.state_at(now).session().map(|s| s.expires_in(now))
    }

    pub fn set_token(&self, token: &str) -> anyhow::Result<()> {
        self.store.set(token)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.store.clear()
    }
}

#[cfg(test)]
#[path = "tests/session/session_tests.rs"]
mod tests;
