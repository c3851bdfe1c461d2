//! Authenticated portal client.
//!
//! Login is a three-step handshake:
//!
//! 1. `GET` the landing page and scrape its hidden form fields;
//! 2. `POST` them back with `Username`/`Password` (this sets the session cookies);
//! 3. exchange the configured refresh token at `/can-bo/access-token` for a
//!    bearer token.
//!
//! Every later call goes through [`PortalClient::request`], which attaches the
//! session headers and parses the body as JSON, falling back to text.

use std::time::Duration;

use serde_json::Value;

use crate::config::PortalConfig;
use crate::portal::error::{PortalError, PortalResult};
use crate::portal::login;
use crate::portal::session::{Credentials, Session, SessionState, TokenGrant};
use crate::portal::transport::{
    HeaderMap, HttpRequest, HttpResponse, HttpTransport, Method, UreqTransport,
};

/// Characters of a failing response body quoted in errors.
const ERROR_PREVIEW_CHARS: usize = 300;

/// Parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Json(Value),
    Text(String),
}

impl ApiBody {
    fn parse(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(json) => Self::Json(json),
            Err(_) => Self::Text(body),
        }
    }

    /// The JSON value, or a `Malformed` error naming `url`.
    pub fn into_json(self, url: &str) -> PortalResult<Value> {
        match self {
            Self::Json(json) => Ok(json),
            Self::Text(text) => Err(PortalError::Malformed {
                url: url.into(),
                message: format!(
                    "expected JSON, got text: {}",
                    HttpResponse::new(200, text).preview(ERROR_PREVIEW_CHARS)
                ),
            }),
        }
    }
}

/// Client for one interactive portal session.
pub struct PortalClient<T = UreqTransport> {
    config: PortalConfig,
    transport: T,
    session: Session,
    credentials: Option<Credentials>,
}

impl PortalClient<UreqTransport> {
    /// Client over the network, using the configured timeout.
    pub fn connect(config: PortalConfig, refresh_token: impl Into<String>) -> Self {
        let transport = UreqTransport::new(Duration::from_secs(config.timeout_secs));
        Self::with_transport(config, refresh_token, transport)
    }
}

impl<T: HttpTransport> PortalClient<T> {
    pub fn with_transport(
        config: PortalConfig,
        refresh_token: impl Into<String>,
        transport: T,
    ) -> Self {
        let headers = default_headers(&config);
        Self {
            config,
            transport,
            session: Session::new(refresh_token, headers),
            credentials: None,
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform the login handshake and obtain an access token.
    ///
    /// On failure the session is left in [`SessionState::Failed`] and the
    /// credentials are not kept.
    pub fn login(&mut self, credentials: Credentials) -> PortalResult<()> {
        self.session.begin_login();
        self.credentials = None;
        if let Err(e) = self.submit_login_form(&credentials) {
            self.session.fail();
            return Err(e);
        }

        let refresh_token = self.session.refresh_token().to_string();
        self.exchange_refresh_token(&refresh_token)?;

        tracing::info!(username = %credentials.username, "logged in to portal");
        self.credentials = Some(credentials);
        Ok(())
    }

    fn submit_login_form(&self, credentials: &Credentials) -> PortalResult<()> {
        let url = self.config.base_url.as_str();

        let page = self
            .transport
            .send(&HttpRequest::get(url).headers(self.session.headers()))
            .map_err(|e| auth_error("login page unreachable", e))?;
        if !page.is_success() {
            return Err(PortalError::Auth {
                message: format!("login page returned HTTP {}", page.status),
            });
        }

        let hidden = login::hidden_fields(&page.body);
        tracing::debug!(fields = hidden.len(), "scraped login form");
        let form = login::login_form(hidden, credentials);

        let response = self
            .transport
            .send(&HttpRequest::post(url).form(form).headers(self.session.headers()))
            .map_err(|e| auth_error("login request failed", e))?;
        if !response.is_success() {
            return Err(PortalError::Auth {
                message: format!(
                    "login was rejected with HTTP {}: {}",
                    response.status,
                    response.preview(ERROR_PREVIEW_CHARS)
                ),
            });
        }
        Ok(())
    }

    /// Exchange a refresh token for an access token and install it.
    ///
    /// A `success: false` answer is an [`PortalError::Auth`] carrying the
    /// portal's message. A rotated refresh token in the answer is logged and
    /// not adopted.
    pub fn exchange_refresh_token(&mut self, refresh_token: &str) -> PortalResult<TokenGrant> {
        match self.fetch_token(refresh_token) {
            Ok(grant) => {
                self.session.authenticate(grant.access_token.clone());
                Ok(grant)
            }
            Err(e) => {
                self.session.fail();
                Err(e)
            }
        }
    }

    fn fetch_token(&self, refresh_token: &str) -> PortalResult<TokenGrant> {
        let url = format!("{}/can-bo/access-token", self.config.api_url);
        let request = HttpRequest::get(&url)
            .query(&[("refresh_token", refresh_token)])
            .headers(self.session.headers());

        let response = self
            .transport
            .send(&request)
            .map_err(|e| auth_error("access token request failed", e))?;
        if !response.is_success() {
            return Err(PortalError::Auth {
                message: format!(
                    "access token request returned HTTP {}: {}",
                    response.status,
                    response.preview(ERROR_PREVIEW_CHARS)
                ),
            });
        }

        let raw: Value = serde_json::from_str(&response.body).map_err(|e| PortalError::Auth {
            message: format!("access token response is not JSON: {e}"),
        })?;

        if raw["success"].as_bool() != Some(true) {
            let reason = raw["message"].as_str().unwrap_or("no reason given");
            return Err(PortalError::Auth {
                message: format!("access token request was refused: {reason}"),
            });
        }

        let access_token = raw["data"]["access_token"]
            .as_str()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PortalError::Auth {
                message: "access token response has no data.access_token".into(),
            })?
            .to_string();

        if let Some(rotated) = raw["data"]["refresh_token"].as_str() {
            if !rotated.is_empty() && rotated != refresh_token {
                tracing::debug!(
                    "portal issued a rotated refresh token; keeping the configured one"
                );
            }
        }

        Ok(TokenGrant { access_token, raw })
    }

    /// Issue an authenticated call.
    ///
    /// `form` is sent as the POST body and ignored for GET. Non-2xx statuses
    /// are [`PortalError::Api`]; a body that is not JSON comes back as
    /// [`ApiBody::Text`].
    pub fn request(
        &self,
        method: Method,
        url: &str,
        form: Vec<(String, String)>,
        query: &[(&str, &str)],
    ) -> PortalResult<ApiBody> {
        if !self.session.is_authenticated() {
            return Err(PortalError::Auth {
                message: "not logged in".into(),
            });
        }

        let mut request = HttpRequest::new(method, url)
            .query(query)
            .headers(self.session.headers());
        if method == Method::Post {
            request = request.form(form);
        }

        let response = self.transport.send(&request)?;
        if !response.is_success() {
            return Err(PortalError::Api {
                url: url.into(),
                status: response.status,
                message: response.preview(ERROR_PREVIEW_CHARS),
            });
        }
        Ok(ApiBody::parse(response.body))
    }

    /// Forget the token and the credentials.
    pub fn logout(&mut self) {
        self.session.reset();
        self.credentials = None;
        tracing::info!("logged out");
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }
}

impl<T> std::fmt::Debug for PortalClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("base_url", &self.config.base_url)
            .field("api_url", &self.config.api_url)
            .field("session", &self.session)
            .field("credentials", &self.credentials)
            .finish()
    }
}

fn default_headers(config: &PortalConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Accept".into(), "*/*".into());
    headers.insert("Accept-Language".into(), config.accept_language.clone());
    headers.insert("User-Agent".into(), config.user_agent.clone());
    headers
}

fn auth_error(context: &str, e: PortalError) -> PortalError {
    PortalError::Auth {
        message: format!("{context}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_parses_json_or_falls_back_to_text() {
        assert_eq!(
            ApiBody::parse(r#"{"success":true}"#.into()),
            ApiBody::Json(serde_json::json!({"success": true}))
        );
        assert_eq!(
            ApiBody::parse("<html>oops</html>".into()),
            ApiBody::Text("<html>oops</html>".into())
        );
    }

    #[test]
    fn text_body_is_malformed_when_json_expected() {
        let err = ApiBody::Text("plain".into()).into_json("http://x").unwrap_err();
        assert!(matches!(err, PortalError::Malformed { .. }));
    }

    #[test]
    fn default_headers_carry_configured_identity() {
        let config = PortalConfig {
            user_agent: "vpdt-test".into(),
            ..Default::default()
        };
        let headers = default_headers(&config);
        assert_eq!(headers.get("User-Agent").unwrap(), "vpdt-test");
        assert_eq!(headers.get("Accept").unwrap(), "*/*");
        assert!(!headers.contains_key("Authorization"));
    }
}
