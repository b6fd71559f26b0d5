//! Admin sessions
//!
//! A [`Session`] is the only place an admin token lives. It is created by
//! [`ApiClient::login`] or restored from a saved token, passed explicitly to
//! every admin call, and ended with [`Session::logout`]. A 401 from the
//! backend invalidates it for good.

use crate::client::{ApiClient, error_detail};
use crate::error::{ClientError, ClientResult};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use ticketing_core::models::{AdminProfile, LoginResponse};
use tracing::{info, warn};

/// Backend path of the admin login
pub const LOGIN_PATH: &str = "/api/admin/login";

/// An authenticated admin session
pub struct Session {
    token: String,
    user: AdminProfile,
    active: AtomicBool,
}

impl Session {
    /// Restore a session from a previously issued token
    ///
    /// The token is not checked until the first admin call.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(token.into(), AdminProfile::default())
    }

    fn new(token: String, user: AdminProfile) -> Self {
        Self {
            token,
            user,
            active: AtomicBool::new(true),
        }
    }

    /// Bearer token sent with admin calls
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Admin that logged in, when known
    pub const fn user(&self) -> &AdminProfile {
        &self.user
    }

    /// Whether admin calls may still use this session
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn invalidate(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            warn!(user = ?self.user.email, "Admin session invalidated by the backend");
        }
    }

    /// End the session
    pub fn logout(self) {
        info!(user = ?self.user.email, "Admin logged out");
    }

    /// Send an authorized request, invalidating the session on 401
    pub(crate) async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        if !self.is_active() {
            return Err(ClientError::Unauthorized);
        }

        let response = request.bearer_auth(&self.token).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.invalidate();
            return Err(ClientError::Unauthorized);
        }
        Ok(response)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Log in as an admin
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Login`] with the message to show when the
    /// backend refuses, [`ClientError::Connectivity`] when it cannot be
    /// reached, and [`ClientError::Validation`] for empty credentials.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::validation("Email and password are required"));
        }

        let response = self
            .http()
            .post(self.endpoint(LOGIN_PATH))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!(%email, status = status.as_u16(), "Admin login refused");
            return Err(ClientError::login(login_failure_message(
                status,
                error_detail(&body),
            )));
        }

        let login: LoginResponse = serde_json::from_slice(&body)?;
        info!(%email, "Admin logged in");
        Ok(Session::new(login.access_token, login.user))
    }
}

fn login_failure_message(status: StatusCode, detail: Option<String>) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "Invalid email or password.".to_string(),
        StatusCode::FORBIDDEN => "Account not verified or access denied.".to_string(),
        status if status.is_server_error() => "Server error. Please try again later.".to_string(),
        _ => detail.unwrap_or_else(|| "Login failed. Please try again.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_login_failure_messages() {
        assert_eq!(
            login_failure_message(StatusCode::UNAUTHORIZED, Some("ignored".to_string())),
            "Invalid email or password."
        );
        assert_eq!(
            login_failure_message(StatusCode::FORBIDDEN, None),
            "Account not verified or access denied."
        );
        assert_eq!(
            login_failure_message(StatusCode::BAD_GATEWAY, None),
            "Server error. Please try again later."
        );
        assert_eq!(
            login_failure_message(StatusCode::UNPROCESSABLE_ENTITY, None),
            "Login failed. Please try again."
        );
        assert_eq!(
            login_failure_message(StatusCode::BAD_REQUEST, Some("Account is disabled".to_string())),
            "Account is disabled"
        );
    }

    #[test]
    fn test_invalidate_is_permanent() {
        let session = Session::from_token("abc");
        assert!(session.is_active());
        session.invalidate();
        session.invalidate();
        assert!(!session.is_active());
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::from_token("secret-token");
        assert!(!format!("{session:?}").contains("secret-token"));
    }
}
