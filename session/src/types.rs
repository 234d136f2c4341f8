//! Session data model and the wire shapes exchanged with the auth service.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// USER
// =============================================================================

/// The signed-in user as reported by `GET /api/users/me`.
///
/// Owned by the authentication service. Fields this client does not know
/// about are kept in `extra` so a round trip loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self { username: username.into(), email: email.into(), id: None, is_active: None, extra: Map::new() }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Lifecycle position of a session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Constructed, `initialize` not yet run.
    #[default]
    Uninitialized,
    /// A token is being verified.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of the current login state.
///
/// Built only through the constructors below so that `is_authenticated`
/// implies `user.is_some()` and `loading` matches `phase`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub phase: SessionPhase,
}

impl Session {
    /// A verification of `token` is in flight.
    #[must_use]
    pub fn loading(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()), user: None, is_authenticated: false, loading: true, phase: SessionPhase::Loading }
    }

    #[must_use]
    pub fn authenticated(token: impl Into<String>, user: User) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
            is_authenticated: true,
            loading: false,
            phase: SessionPhase::Authenticated,
        }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { token: None, user: None, is_authenticated: false, loading: false, phase: SessionPhase::Unauthenticated }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Form body for `POST /api/token`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// JSON body for `POST /api/register`.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of `POST /api/token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
