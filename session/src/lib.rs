//! # session
//!
//! Client-side login session for the dashboard: token persistence, session
//! rehydration at startup, and the login / register / logout flows against
//! the remote authentication service.
//!
//! DESIGN
//! ======
//! `SessionStore` owns an `AuthApi` (network) and a `Storage` (durable
//! key/value slot for the token). Every state change is published on a
//! `tokio::sync::watch` channel so a presentation layer can re-render from
//! the latest `Session` snapshot without reaching into the store.
//!
//! ERROR HANDLING
//! ==============
//! Verification failures never escape the store; they collapse to an
//! unauthenticated session. Login and registration failures are returned to
//! the caller with the service's `detail` message when one was sent.

pub mod api;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;
pub mod types;

pub use api::{AuthApi, HttpAuthApi};
pub use config::SessionConfig;
pub use error::{ApiError, ConfigError, SessionError, StorageError};
pub use storage::{FileStorage, MemoryStorage, Storage, TOKEN_KEY};
pub use store::SessionStore;
pub use types::{Credentials, HealthStatus, Registration, Session, SessionPhase, TokenGrant, User};
