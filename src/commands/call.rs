//! `infisync call`: POST a small JSON note to an arbitrary URL.
//!
//! Handy for checking that a token works against some endpoint. The
//! response is passed through untouched.

use serde::Serialize;

use crate::api::{Request, Transport};
use crate::commands::{Context, Output};

/// Default target when `--url` is not given.
pub const DEFAULT_CALL_URL: &str = "https://httpbin.org/post";

/// Options for `call`.
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub url: String,
    pub note: String,
    /// Used only when `INFISYNC_TOKEN` is unset
    pub token: Option<String>,
}

/// Raw response of the call.
#[derive(Debug, Serialize)]
pub struct CallResult {
    pub status: u16,
    pub body: String,
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl Output for CallResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("HTTP {}\n{}", self.status, self.body)
    }
}

/// Send the note. Never fails; transport errors come back as status 0.
pub fn call<T, F>(ctx: &Context, opts: &CallOptions, connect: F) -> CallResult
where
    T: Transport,
    F: FnOnce(&str) -> T,
{
    let token = ctx
        .settings
        .call_token
        .clone()
        .or_else(|| opts.token.clone());

    let mut request = Request::post("").json(serde_json::json!({ "note": opts.note }));
    if let Some(token) = token {
        request = request.bearer(token);
    }

    let transport = connect(&opts.url);
    let response = transport.execute(&request);
    CallResult {
        status: response.status,
        body: response.body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::config::Settings;
    use crate::test_utils::ScriptedTransport;

    fn options(token: Option<&str>) -> CallOptions {
        CallOptions {
            url: "https://api.example.com/do".to_string(),
            note: "hi".to_string(),
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_call_posts_note() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Post, "", 200, "ok");
        let ctx = Context::new(".", Settings::default());

        let mut seen = String::new();
        let result = call(&ctx, &options(Some("flag-token")), |url| {
            seen = url.to_string();
            &transport
        });

        assert!(result.is_success());
        assert_eq!(result.to_human(), "HTTP 200\nok");
        assert_eq!(seen, "https://api.example.com/do");
        let req = &transport.requests()[0];
        assert_eq!(req.body.as_ref().unwrap()["note"], "hi");
        assert_eq!(req.bearer.as_deref(), Some("flag-token"));
    }

    #[test]
    fn test_environment_token_wins_over_flag() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Post, "", 200, "ok");
        let settings = Settings {
            call_token: Some("env-token".to_string()),
            ..Settings::default()
        };
        let ctx = Context::new(".", settings);

        call(&ctx, &options(Some("flag-token")), |_| &transport);

        assert_eq!(transport.requests()[0].bearer.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_call_without_token_or_answer() {
        let transport = ScriptedTransport::new();
        let ctx = Context::new(".", Settings::default());

        let result = call(&ctx, &options(None), |_| &transport);

        assert!(!result.is_success());
        assert_eq!(result.status, 0);
        assert!(transport.requests()[0].bearer.is_none());
    }
}
