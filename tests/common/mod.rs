//! Scripted HTTP transport shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use vpdt_digest::config::PortalConfig;
use vpdt_digest::portal::{
    Credentials, HttpRequest, HttpResponse, HttpTransport, Method, PortalClient, PortalError,
    PortalResult,
};

pub const PORTAL_URL: &str = "http://portal.test";
pub const API_URL: &str = "http://portal.test/api";
pub const REFRESH_TOKEN: &str = "refresh-abc";
pub const ACCESS_TOKEN: &str = "tok-1";

pub const LOGIN_PAGE: &str = r#"<html><body><form method="post">
<input type="hidden" name="__RequestVerificationToken" value="csrf-1">
<input type="hidden" name="ReturnUrl" value="/">
<input type="text" name="Username">
<input type="password" name="Password">
</form></body></html>"#;

type Matcher = Box<dyn Fn(&HttpRequest) -> bool>;

struct Route {
    matches: Matcher,
    response: Box<dyn Fn(&HttpRequest) -> PortalResult<HttpResponse>>,
}

/// Answers requests from a list of routes; the first matching route wins.
/// Unmatched requests get a 404. Every request is recorded.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Vec<Route>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F>(mut self, method: Method, url: &str, respond: F) -> Self
    where
        F: Fn(&HttpRequest) -> PortalResult<HttpResponse> + 'static,
    {
        let url = url.to_string();
        self.routes.push(Route {
            matches: Box::new(move |req| req.method == method && req.url == url),
            response: Box::new(respond),
        });
        self
    }

    pub fn json(self, method: Method, url: &str, body: serde_json::Value) -> Self {
        let body = body.to_string();
        self.route(method, url, move |_| Ok(HttpResponse::new(200, body.clone())))
    }

    /// The three login steps, answered successfully.
    pub fn with_login(self) -> Self {
        self.route(Method::Get, PORTAL_URL, |_| Ok(HttpResponse::new(200, LOGIN_PAGE)))
            .route(Method::Post, PORTAL_URL, |_| Ok(HttpResponse::new(200, "<html>ok</html>")))
            .json(
                Method::Get,
                &api("/can-bo/access-token"),
                serde_json::json!({
                    "success": true,
                    "message": "OK",
                    "data": {"access_token": ACCESS_TOKEN, "refresh_token": "rotated-xyz"}
                }),
            )
    }

    /// A token endpoint that hands out `tok-1`, `tok-2`, ... on successive
    /// exchanges. Add before [`Self::with_login`] so it wins.
    pub fn rotating_tokens(self) -> Self {
        let issued = Cell::new(0u32);
        self.route(Method::Get, &api("/can-bo/access-token"), move |_| {
            issued.set(issued.get() + 1);
            let body = serde_json::json!({
                "success": true,
                "data": {"access_token": format!("tok-{}", issued.get())}
            });
            Ok(HttpResponse::new(200, body.to_string()))
        })
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.borrow().clone()
    }

    pub fn sent_to(&self, url: &str) -> Vec<HttpRequest> {
        self.sent.borrow().iter().filter(|r| r.url == url).cloned().collect()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> PortalResult<HttpResponse> {
        self.sent.borrow_mut().push(request.clone());
        match self.routes.iter().find(|route| (route.matches)(request)) {
            Some(route) => (route.response)(request),
            None => Ok(HttpResponse::new(404, "not found")),
        }
    }
}

pub fn api(path: &str) -> String {
    format!("{API_URL}{path}")
}

pub fn test_config() -> PortalConfig {
    PortalConfig {
        base_url: PORTAL_URL.into(),
        api_url: API_URL.into(),
        user_agent: "vpdt-test".into(),
        ..Default::default()
    }
}

pub fn client(transport: ScriptedTransport) -> PortalClient<ScriptedTransport> {
    PortalClient::with_transport(test_config(), REFRESH_TOKEN, transport)
}

pub fn credentials() -> Credentials {
    Credentials::new("nva", "mat-khau")
}

pub fn logged_in(transport: ScriptedTransport) -> PortalClient<ScriptedTransport> {
    let mut client = client(transport.with_login());
    client.login(credentials()).unwrap();
    client
}

pub fn unreachable(req: &HttpRequest) -> PortalResult<HttpResponse> {
    Err(PortalError::Transport {
        url: req.url.clone(),
        message: "connection refused".into(),
    })
}
