//! Universal-auth login.
//!
//! A client id/secret pair is exchanged for a bearer token once per
//! invocation. Tokens are never cached or renewed.

use serde::Deserialize;

use crate::api::{Request, Transport};
use crate::{Error, Result};

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/api/v1/auth/universal-auth/login";

/// Machine identity credentials.
#[derive(Clone)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
}

impl Credential {
    /// Build a credential, failing when either half is missing or empty.
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Result<Self> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok(Self {
                client_id: id,
                client_secret: secret,
            }),
            _ => Err(Error::MissingCredentials),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Response from the login endpoint (only fields we care about).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: Option<String>,
}

/// Exchange `credential` for an access token.
///
/// Any non-2xx status (including transport failures, reported as status 0)
/// or a body without `accessToken` is an [`Error::AuthenticationFailed`]
/// carrying the status and raw body. No retry is attempted.
pub fn authenticate(transport: &dyn Transport, credential: &Credential) -> Result<AccessToken> {
    let request = Request::post(LOGIN_PATH).json(serde_json::json!({
        "clientId": credential.client_id,
        "clientSecret": credential.client_secret,
    }));

    let response = transport.execute(&request);
    if !response.is_success() {
        return Err(Error::AuthenticationFailed {
            status: response.status,
            body: response.body,
        });
    }

    match response.json::<LoginResponse>() {
        Ok(LoginResponse {
            access_token: Some(token),
        }) if !token.is_empty() => {
            tracing::info!("authenticated with universal auth");
            Ok(AccessToken::new(token))
        }
        _ => Err(Error::AuthenticationFailed {
            status: response.status,
            body: response.body,
        }),
    }
}
