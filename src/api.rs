//! HTTP plumbing for the Infisical API.
//!
//! Every call the core makes goes through the [`Transport`] trait, which takes a
//! [`Request`] and always yields a [`Response`]. Transport-level failures
//! (DNS, refused connection, timeout) are folded into a response with status `0`
//! and an empty body, so callers only ever reason about status codes.

use std::time::Duration;

use serde::de::DeserializeOwned;

/// Default Infisical origin used when neither the environment nor the project
/// binding names one.
pub const DEFAULT_API_URL: &str = "https://app.infisical.com";

/// Per-request timeout applied to every call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent sent with every request
const USER_AGENT: &str = concat!("infisync/", env!("CARGO_PKG_VERSION"));

/// HTTP methods used against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

/// A request relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path appended to the base URL, e.g. `/api/v4/secrets`
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Bearer token for authenticated calls
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a query parameter by name.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status code and raw body of a completed (or failed) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status, or `0` when the request never got an answer
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The response used for anything that failed below HTTP.
    pub fn transport_failure() -> Self {
        Self::new(0, "")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// At most `max` characters of the body, for diagnostics.
    pub fn excerpt(&self, max: usize) -> String {
        self.body.chars().take(max).collect()
    }
}

/// Something that can carry a [`Request`] to the API.
pub trait Transport {
    fn execute(&self, request: &Request) -> Response;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &Request) -> Response {
        (**self).execute(request)
    }
}

/// Blocking `ureq` transport bound to one API origin.
pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &Request) -> Response {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = request.method.as_str(), %url, "sending request");

        let mut call = self
            .agent
            .request(request.method.as_str(), &url)
            .set("Content-Type", "application/json");
        for (key, value) in &request.query {
            call = call.query(key, value);
        }
        if let Some(token) = &request.bearer {
            call = call.set("Authorization", &format!("Bearer {}", token));
        }

        let result = match &request.body {
            Some(body) => call.send_json(body),
            None => call.call(),
        };

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().unwrap_or_default();
                tracing::debug!(status, %url, "received response");
                Response::new(status, body)
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                tracing::debug!(status, %url, "received error response");
                Response::new(status, body)
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "request failed before a response arrived");
                Response::transport_failure()
            }
        }
    }
}
