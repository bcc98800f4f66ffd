//! Auth gate consumed by the cart.
//!
//! The cart only needs to know whether someone is signed in. Logging in and
//! out happens elsewhere (the auth API); [`SessionAuthGate`] holds the result
//! the way the browser session does, including its expiry.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use tokoku_core::{Email, UserId};

/// Default lifetime of a signed-in session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(2);

/// The signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    #[must_use]
    pub const fn new(id: UserId, email: Email) -> Self {
        Self {
            id,
            email,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Reports the currently authenticated user, if any.
pub trait AuthGate {
    /// The signed-in user, or `None` for anonymous shoppers.
    fn current_user(&self) -> Option<User>;

    /// Whether anyone is signed in.
    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

impl<T: AuthGate + ?Sized> AuthGate for &T {
    fn current_user(&self) -> Option<User> {
        (**self).current_user()
    }
}

impl<T: AuthGate + ?Sized> AuthGate for Arc<T> {
    fn current_user(&self) -> Option<User> {
        (**self).current_user()
    }
}

impl AuthGate for Option<User> {
    fn current_user(&self) -> Option<User> {
        self.clone()
    }
}

#[derive(Debug, Clone)]
struct Session {
    user: User,
    signed_in_at: DateTime<Utc>,
}

/// Session-backed auth gate with a fixed time-to-live.
///
/// Clones share the same session, so the sign-in flow and the cart can each
/// hold a handle.
#[derive(Debug, Clone)]
pub struct SessionAuthGate {
    session: Arc<RwLock<Option<Session>>>,
    ttl: Duration,
}

impl Default for SessionAuthGate {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionAuthGate {
    /// Create an anonymous gate whose sessions last `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Session lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `user` in now.
    pub fn sign_in(&self, user: User) {
        self.sign_in_at(user, Utc::now());
    }

    /// Sign `user` in as of `signed_in_at`.
    pub fn sign_in_at(&self, user: User, signed_in_at: DateTime<Utc>) {
        tracing::debug!(user_id = %user.id, "Session started");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Session { user, signed_in_at });
    }

    /// End the session. Returns the user that was signed in.
    pub fn sign_out(&self) -> Option<User> {
        let previous = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = &previous {
            tracing::debug!(user_id = %session.user.id, "Session ended");
        }
        previous.map(|session| session.user)
    }

    /// The signed-in user as of `now`.
    ///
    /// A session older than the TTL is discarded and reports no user.
    #[must_use]
    pub fn current_user_at(&self, now: DateTime<Utc>) -> Option<User> {
        let expired = {
            let guard = self.session.read().unwrap_or_else(PoisonError::into_inner);
            match guard.as_ref() {
                None => return None,
                Some(session) if now - session.signed_in_at <= self.ttl => {
                    return Some(session.user.clone());
                }
                Some(session) => session.user.id,
            }
        };

        tracing::info!(user_id = %expired, "Session expired");
        self.session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        None
    }
}

impl AuthGate for SessionAuthGate {
    fn current_user(&self) -> Option<User> {
        self.current_user_at(Utc::now())
    }
}
