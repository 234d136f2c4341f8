//! Session store: token persistence plus the login state machine.
//!
//! STATE MACHINE
//! =============
//! `Uninitialized -> Loading -> {Authenticated, Unauthenticated}` on
//! `initialize` with a stored token; `Uninitialized -> Unauthenticated`
//! when none is stored. `login` and `logout` move between the two settled
//! states. Only the persisted token outlives the process.
//!
//! CONCURRENCY
//! ===========
//! Mutating operations take `&mut self`, so a second login or verify on the
//! same store cannot start while one is suspended on the network.

use tokio::sync::watch;

use crate::api::AuthApi;
use crate::error::SessionError;
use crate::storage::{Storage, TOKEN_KEY};
use crate::types::{Credentials, Registration, Session, SessionPhase};

pub struct SessionStore<A, S> {
    api: A,
    storage: S,
    state: watch::Sender<Session>,
}

impl<A: AuthApi, S: Storage> SessionStore<A, S> {
    #[must_use]
    pub fn new(api: A, storage: S) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { api, storage, state }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    /// Receiver that observes every published session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Rehydrate the session from the persisted token.
    pub async fn initialize(&mut self) {
        let stored = match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted token; starting signed out");
                None
            }
        };

        match stored {
            Some(token) => {
                tracing::debug!("rehydrating session from persisted token");
                self.verify(&token).await;
            }
            None => {
                tracing::debug!("no persisted token");
                self.publish(Session::unauthenticated());
            }
        }
    }

    /// Check `token` against the service and settle the session.
    ///
    /// Any failure drops the persisted token and leaves the session signed
    /// out. Returns whether the session ended authenticated.
    pub async fn verify(&mut self, token: &str) -> bool {
        self.publish(Session::loading(token));

        match self.api.whoami(token).await {
            Ok(user) => {
                tracing::info!(username = %user.username, "session verified");
                self.publish(Session::authenticated(token, user));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "session verification failed");
                self.forget_token();
                self.publish(Session::unauthenticated());
                false
            }
        }
    }

    /// Exchange credentials for a token, persist it, then verify it.
    ///
    /// # Errors
    ///
    /// Returns the service or storage error; the session is left as it was.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        let credentials = Credentials { username: username.to_owned(), password: password.to_owned() };
        let grant = self.api.issue_token(&credentials).await.inspect_err(|e| {
            tracing::info!(%username, error = %e, "login rejected");
        })?;

        self.storage.set_item(TOKEN_KEY, &grant.access_token)?;
        tracing::debug!(%username, "token issued and persisted");

        self.verify(&grant.access_token).await;
        Ok(())
    }

    /// Create an account. The session is not touched.
    ///
    /// # Errors
    ///
    /// Returns the service error, e.g. when the username is taken.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), SessionError> {
        let registration =
            Registration { username: username.to_owned(), email: email.to_owned(), password: password.to_owned() };
        self.api.register(&registration).await.inspect_err(|e| {
            tracing::info!(%username, error = %e, "registration rejected");
        })?;
        tracing::info!(%username, "registered");
        Ok(())
    }

    /// Drop the persisted token and sign out. No network call.
    pub fn logout(&mut self) {
        self.forget_token();
        self.publish(Session::unauthenticated());
        tracing::info!("logged out");
    }

    fn forget_token(&mut self) {
        if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
            tracing::warn!(error = %e, "could not remove persisted token");
        }
    }

    fn publish(&self, session: Session) {
        self.state.send_replace(session);
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
