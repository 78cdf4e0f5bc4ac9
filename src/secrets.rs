//! Reading the secret set of a project environment.

use serde::Deserialize;

use crate::api::{Request, Transport};
use crate::auth::AccessToken;
use crate::envfile::SecretEntry;
use crate::environment::Environment;
use crate::{Error, Result};

/// Secrets collection path (v4 API).
pub const SECRETS_PATH: &str = "/api/v4/secrets";

/// The only secret path this tool works with.
pub const ROOT_SECRET_PATH: &str = "/";

/// Path of a single secret. The key is encoded as one path segment.
pub fn secret_path(key: &str) -> String {
    format!("{}/{}", SECRETS_PATH, urlencoding::encode(key))
}

#[derive(Debug, Deserialize)]
struct SecretsResponse {
    secrets: Vec<serde_json::Value>,
}

/// Pull key and value out of one raw secret object.
fn entry_from_value(value: &serde_json::Value) -> Option<SecretEntry> {
    let key = value.get("secretKey")?.as_str()?;
    let secret = value.get("secretValue")?.as_str()?;
    let comment = value
        .get("secretComment")
        .and_then(|c| c.as_str())
        .unwrap_or_default();
    Some(SecretEntry {
        key: key.to_string(),
        value: secret.to_string(),
        comment: comment.to_string(),
    })
}

/// Fetch every secret at the root path of `project_id`/`environment`.
///
/// Secrets are returned in response order. Objects lacking a string
/// `secretKey` or `secretValue` are skipped.
pub fn fetch(
    transport: &dyn Transport,
    token: &AccessToken,
    project_id: &str,
    environment: Environment,
) -> Result<Vec<SecretEntry>> {
    let request = Request::get(SECRETS_PATH)
        .query("projectId", project_id)
        .query("environment", environment.as_str())
        .query("secretPath", ROOT_SECRET_PATH)
        .query("viewSecretValue", "true")
        .bearer(token.as_str());

    let response = transport.execute(&request);
    if !response.is_success() {
        return Err(Error::RemoteRejected {
            operation: "retrieve secrets",
            status: response.status,
            body: response.body,
        });
    }

    let parsed: SecretsResponse = response.json().map_err(|e| {
        Error::MalformedResponse(format!("expected a `secrets` list: {}", e))
    })?;

    let total = parsed.secrets.len();
    let entries: Vec<SecretEntry> = parsed.secrets.iter().filter_map(entry_from_value).collect();
    if entries.len() < total {
        tracing::warn!(
            skipped = total - entries.len(),
            "skipped secrets without a key or value"
        );
    }
    tracing::info!(count = entries.len(), %environment, "fetched secrets");
    Ok(entries)
}
