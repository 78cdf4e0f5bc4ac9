//! Creating projects.
//!
//! The creation endpoint has returned the new id in more than one place
//! over time, so the id is looked up through [`ID_RULES`], in order.

use crate::api::{Request, Transport};
use crate::auth::AccessToken;
use crate::{Error, Result};

/// Project creation endpoint.
pub const PROJECTS_PATH: &str = "/api/v1/projects";

/// Description attached to every project created by this tool.
pub const PROJECT_DESCRIPTION: &str = "Created by infisync";

/// JSON pointers tried, in order, to find a new project's id.
pub const ID_RULES: &[&str] = &["/project/id", "/project/_id", "/id"];

/// A freshly created remote project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProject {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// URL-safe slug: lower case, spaces and underscores turned into hyphens,
/// suffixed with `unix_ts` so repeated names stay unique.
pub fn slugify(name: &str, unix_ts: i64) -> String {
    let base: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect();
    format!("{}-{}", base, unix_ts)
}

/// Apply [`ID_RULES`] to a creation response; first non-empty match wins.
///
/// Numeric ids are accepted and rendered as strings.
pub fn extract_project_id(body: &serde_json::Value) -> Option<String> {
    ID_RULES.iter().find_map(|pointer| match body.pointer(pointer)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Create a secret-manager project named `name` with default environments.
pub fn create(
    transport: &dyn Transport,
    token: &AccessToken,
    name: &str,
    unix_ts: i64,
) -> Result<CreatedProject> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("project name must not be empty".to_string()));
    }
    let slug = slugify(name, unix_ts);

    let request = Request::post(PROJECTS_PATH)
        .bearer(token.as_str())
        .json(serde_json::json!({
            "projectName": name,
            "projectDescription": PROJECT_DESCRIPTION,
            "slug": slug,
            "template": "default",
            "type": "secret-manager",
            "shouldCreateDefaultEnvs": true,
        }));

    let response = transport.execute(&request);
    if !response.is_success() {
        return Err(Error::RemoteRejected {
            operation: "create project",
            status: response.status,
            body: response.body,
        });
    }

    let body: serde_json::Value = response
        .json()
        .map_err(|e| Error::MalformedResponse(format!("project creation response: {}", e)))?;
    let id = extract_project_id(&body).ok_or_else(|| {
        Error::MalformedResponse("project creation response carries no project id".to_string())
    })?;

    tracing::info!(project_id = %id, %slug, "created project");
    Ok(CreatedProject {
        id,
        name: name.to_string(),
        slug,
    })
}
