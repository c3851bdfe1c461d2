//! Session state: tokens, headers and the login state machine.
//!
//! ```text
//! Anonymous ──login──▶ LoggingIn ──token──▶ Authenticated ──refresh──▶ Authenticated
//!                          │                      │
//!                          └──────error──────▶ Failed ◀──error──┘
//! ```
//!
//! The session owns the header map sent with every call, so a refreshed
//! bearer token is seen by all later requests of the same client.

use crate::portal::transport::HeaderMap;

const AUTHORIZATION: &str = "Authorization";

/// Where the session is in the login handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    LoggingIn,
    Authenticated,
    Failed,
}

/// Username and password, held in memory for the session lifetime.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Result of exchanging a refresh token.
#[derive(Clone)]
pub struct TokenGrant {
    pub access_token: String,
    /// The token endpoint's full JSON response.
    pub raw: serde_json::Value,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"***")
            .finish_non_exhaustive()
    }
}

/// Authenticated session state owned by one client.
pub struct Session {
    state: SessionState,
    access_token: Option<String>,
    refresh_token: String,
    headers: HeaderMap,
}

impl Session {
    /// A fresh anonymous session sending `base_headers` on every call.
    pub fn new(refresh_token: impl Into<String>, base_headers: HeaderMap) -> Self {
        Self {
            state: SessionState::Anonymous,
            access_token: None,
            refresh_token: refresh_token.into(),
            headers: base_headers,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// True once a non-empty access token is installed.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
            && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub(crate) fn begin_login(&mut self) {
        self.state = SessionState::LoggingIn;
    }

    /// Install a new access token and its bearer header.
    pub(crate) fn authenticate(&mut self, access_token: String) {
        self.headers
            .insert(AUTHORIZATION.into(), format!("Bearer {access_token}"));
        self.access_token = Some(access_token);
        self.state = SessionState::Authenticated;
    }

    pub(crate) fn fail(&mut self) {
        self.drop_token();
        self.state = SessionState::Failed;
    }

    pub(crate) fn reset(&mut self) {
        self.drop_token();
        self.state = SessionState::Anonymous;
    }

    fn drop_token(&mut self) {
        self.headers.remove(AUTHORIZATION);
        self.access_token = None;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("has_access_token", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}
