//! Project bindings: which Infisical project a directory syncs with.
//!
//! Two on-disk shapes are understood:
//!
//! - `.infisical.json`, written by `infisync init`:
//!   `{projectId, projectName, slug, environment, apiUrl, createdAt}`
//! - `.infisical.workspace.json`, the older layout:
//!   `{workspaceId, apiUrl}`
//!
//! The primary file always wins; the legacy file is only consulted when the
//! primary one is missing or unusable. Both shapes become a [`ProjectBinding`]
//! right here and go no further.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::environment::{Environment, deserialize_lenient};
use crate::{Error, Result};

/// Binding file written by `init`.
pub const PRIMARY_FILE: &str = ".infisical.json";

/// Older binding file keyed by `workspaceId`.
pub const LEGACY_FILE: &str = ".infisical.workspace.json";

/// The canonical in-memory binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectBinding {
    /// Remote project id, never empty
    pub project_id: String,
    pub environment: Environment,
    /// API origin recorded at creation time
    pub api_url: Option<String>,
    pub project_name: Option<String>,
    pub slug: Option<String>,
    /// RFC 3339 creation timestamp
    pub created_at: Option<String>,
}

impl ProjectBinding {
    /// A binding for `project_id` with every optional field unset.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            environment: Environment::Dev,
            api_url: None,
            project_name: None,
            slug: None,
            created_at: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryConfig {
    project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    environment: Environment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyConfig {
    workspace_id: String,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(
        default,
        alias = "defaultEnvironment",
        deserialize_with = "deserialize_lenient"
    )]
    environment: Environment,
}

/// Either on-disk shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OnDiskBinding {
    Primary(PrimaryConfig),
    Legacy(LegacyConfig),
}

impl From<OnDiskBinding> for ProjectBinding {
    fn from(disk: OnDiskBinding) -> Self {
        match disk {
            OnDiskBinding::Primary(c) => ProjectBinding {
                project_id: c.project_id,
                environment: c.environment,
                api_url: c.api_url,
                project_name: c.project_name,
                slug: c.slug,
                created_at: c.created_at,
            },
            OnDiskBinding::Legacy(c) => ProjectBinding {
                api_url: c.api_url,
                environment: c.environment,
                ..ProjectBinding::new(c.workspace_id)
            },
        }
    }
}

/// Load one binding file; `None` if it is missing, unparsable, or has an
/// empty id.
fn load(path: &Path) -> Option<ProjectBinding> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<OnDiskBinding>(&text) {
        Ok(disk) => {
            let binding = ProjectBinding::from(disk);
            if binding.project_id.trim().is_empty() {
                tracing::warn!(path = %path.display(), "binding file has an empty project id");
                return None;
            }
            Some(binding)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable binding file");
            None
        }
    }
}

/// Find the binding for `dir`, primary file first.
pub fn resolve(dir: &Path) -> Option<ProjectBinding> {
    [PRIMARY_FILE, LEGACY_FILE].iter().find_map(|name| {
        let path = dir.join(name);
        let binding = load(&path)?;
        tracing::debug!(path = %path.display(), project_id = %binding.project_id, "resolved project binding");
        Some(binding)
    })
}

/// Like [`resolve`], but a missing binding is [`Error::NotBound`].
pub fn require(dir: &Path) -> Result<ProjectBinding> {
    resolve(dir).ok_or_else(|| Error::NotBound(dir.to_path_buf()))
}

/// Write `binding` to the primary file in `dir`.
pub fn save(dir: &Path, binding: &ProjectBinding) -> Result<PathBuf> {
    if binding.project_id.trim().is_empty() {
        return Err(Error::InvalidInput(
            "refusing to save a binding without a project id".to_string(),
        ));
    }

    let disk = PrimaryConfig {
        project_id: binding.project_id.clone(),
        project_name: binding.project_name.clone(),
        slug: binding.slug.clone(),
        environment: binding.environment,
        api_url: binding.api_url.clone(),
        created_at: binding.created_at.clone(),
    };
    let mut json = serde_json::to_string_pretty(&disk)?;
    json.push('\n');

    let path = dir.join(PRIMARY_FILE);
    crate::sys::write_locked(&path, &json)?;
    Ok(path)
}
