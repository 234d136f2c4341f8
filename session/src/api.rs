//! Authentication service client.
//!
//! `AuthApi` is the seam the session store talks through; `HttpAuthApi` is
//! the real implementation over `reqwest`. Pure helpers (`parse_detail`)
//! are split out for testability.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::types::{Credentials, HealthStatus, Registration, TokenGrant, User};

pub const USERS_ME_PATH: &str = "/api/users/me";
pub const TOKEN_PATH: &str = "/api/token";
pub const REGISTER_PATH: &str = "/api/register";
pub const HEALTH_PATH: &str = "/api/health";

/// Calls the session store needs from the authentication service.
#[async_trait::async_trait]
pub trait AuthApi {
    /// Resolve a bearer token to its user.
    async fn whoami(&self, token: &str) -> Result<User, ApiError>;

    /// Exchange credentials for an access token.
    async fn issue_token(&self, credentials: &Credentials) -> Result<TokenGrant, ApiError>;

    /// Create an account. Does not sign the user in.
    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpAuthApi {
    http: reqwest::Client,
    config: SessionConfig,
}

impl HttpAuthApi {
    /// Build a client for the service at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &SessionConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config: config.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Query `GET /api/health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or unhealthy.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .http
            .get(self.config.endpoint(HEALTH_PATH))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn whoami(&self, token: &str) -> Result<User, ApiError> {
        let response = self
            .http
            .get(self.config.endpoint(USERS_ME_PATH))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_json(response).await
    }

    async fn issue_token(&self, credentials: &Credentials) -> Result<TokenGrant, ApiError> {
        let response = self
            .http
            .post(self.config.endpoint(TOKEN_PATH))
            .form(credentials)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_json(response).await
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.config.endpoint(REGISTER_PATH))
            .json(registration)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        check_status(response).await.map(|_| ())
    }
}

// =============================================================================
// RESPONSE HANDLING
// =============================================================================

/// Read the body and fail with the service's `detail` on non-2xx.
async fn check_status(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), detail: parse_detail(&text) });
    }
    Ok(text)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = check_status(response).await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Extract a human-readable message from an error body.
///
/// Understands `{ "detail": "..." }` and the validation form
/// `{ "detail": [{ "msg": "..." }, ...] }`. Anything else yields `None`.
pub(crate) fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if messages.is_empty() { None } else { Some(messages.join("; ")) }
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
