//! HTTP transport seam.
//!
//! [`PortalClient`](crate::portal::PortalClient) talks to the network only
//! through [`HttpTransport`]. The production implementation wraps a `ureq`
//! agent with a cookie store, so the login cookies set by the portal travel
//! with every later call.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::portal::error::{PortalError, PortalResult};

/// Request headers, sent in key order.
pub type HeaderMap = BTreeMap<String, String>;

/// HTTP method used by the portal API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully described outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Sent as `application/x-www-form-urlencoded` on POST.
    pub form: Vec<(String, String)>,
    pub headers: HeaderMap,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            form: Vec::new(),
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn query(mut self, pairs: &[(&str, &str)]) -> Self {
        self.query
            .extend(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.form = pairs;
        self
    }

    pub fn headers(mut self, headers: &HeaderMap) -> Self {
        self.headers = headers.clone();
        self
    }

    /// Value of a query parameter, if present.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a form field, if present.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response with any status code. Non-2xx is not an error at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The first `max_chars` characters of the body, for error messages.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.body.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// Sends requests; fails only when no response was received.
pub trait HttpTransport {
    fn send(&self, request: &HttpRequest) -> PortalResult<HttpResponse>;
}

/// Blocking transport backed by a cookie-carrying `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> PortalResult<HttpResponse> {
        let mut call = match request.method {
            Method::Get => self.agent.get(&request.url),
            Method::Post => self.agent.post(&request.url),
        };
        for (key, value) in &request.query {
            call = call.query(key, value);
        }
        for (key, value) in &request.headers {
            call = call.set(key, value);
        }

        tracing::debug!(method = %request.method, url = %request.url, "portal request");

        let result = match request.method {
            Method::Get => call.call(),
            Method::Post => {
                let form: Vec<(&str, &str)> = request
                    .form
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                call.send_form(&form)
            }
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(PortalError::Transport {
                    url: request.url.clone(),
                    message: transport.to_string(),
                });
            }
        };

        let status = response.status();
        let body = response.into_string().map_err(|e| PortalError::Transport {
            url: request.url.clone(),
            message: format!("read body: {e}"),
        })?;
        Ok(HttpResponse { status, body })
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}
