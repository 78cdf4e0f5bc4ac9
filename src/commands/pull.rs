//! `infisync pull`: replace the local env file with the remote secrets.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Serialize;

use crate::api::Transport;
use crate::commands::{Context, Output};
use crate::config::{ValueSource, binding};
use crate::envfile::{
    self, API_URL_KEY, CLIENT_ID_KEY, CLIENT_SECRET_KEY, DEFAULT_HEADER, ENV_KEY, PROJECT_ID_KEY,
};
use crate::environment::Environment;
use crate::{Result, auth, secrets};

/// Options for `pull`.
#[derive(Debug, Clone)]
pub struct PullOptions {
    /// Environment override; the binding's environment otherwise
    pub environment: Option<String>,
    /// Env file to write, relative to the working directory
    pub output: PathBuf,
}

/// Result of a successful pull.
#[derive(Debug, Serialize)]
pub struct PullResult {
    pub project_id: String,
    pub environment: Environment,
    pub output: PathBuf,
    pub secret_count: usize,
    pub keys: Vec<String>,
}

impl Output for PullResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Pulled {} secrets from project {} ({}) into {}",
            self.secret_count,
            self.project_id,
            self.environment,
            self.output.display()
        )
    }
}

/// Credential lines to carry over from the file being replaced.
fn preserved_credentials(existing: &str) -> Vec<(String, String)> {
    envfile::parse_reserved(existing)
        .into_iter()
        .filter(|(k, _)| k == CLIENT_ID_KEY || k == CLIENT_SECRET_KEY)
        .collect()
}

/// Fetch the bound project's secrets and write them to the env file.
pub fn pull<T, F>(ctx: &Context, opts: &PullOptions, connect: F) -> Result<PullResult>
where
    T: Transport,
    F: FnOnce(&str) -> T,
{
    let credential = ctx.settings.credential()?;
    let binding = binding::require(&ctx.working_dir)?;
    let environment = ctx
        .settings
        .bound_environment(opts.environment.as_deref(), &binding);
    let api_url = ctx.settings.api_url(Some(&binding));
    tracing::debug!(api_url = %api_url.value, source = %api_url.source, "using API origin");

    let transport = connect(&api_url.value);
    let token = auth::authenticate(&transport, &credential)?;
    let mut entries =
        secrets::fetch(&transport, &token, &binding.project_id, environment.value)?;
    entries.retain(|entry| !envfile::is_reserved(&entry.key));

    let path = ctx.path(&opts.output);
    let mut snapshot = match std::fs::read(&path) {
        Ok(bytes) => preserved_credentials(&String::from_utf8_lossy(&bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    // The file is loaded back into the environment on the next run, where
    // an API URL line would shadow the binding's apiUrl.
    if matches!(api_url.source, ValueSource::EnvVar(_)) {
        snapshot.push((API_URL_KEY.to_string(), api_url.value.clone()));
    }
    snapshot.push((PROJECT_ID_KEY.to_string(), binding.project_id.clone()));
    snapshot.push((ENV_KEY.to_string(), environment.value.to_string()));

    let text = envfile::serialize(&entries, DEFAULT_HEADER, &snapshot);
    crate::sys::write_locked(&path, &text)?;
    tracing::info!(path = %path.display(), count = entries.len(), "wrote env file");

    Ok(PullResult {
        project_id: binding.project_id,
        environment: environment.value,
        output: opts.output.clone(),
        secret_count: entries.len(),
        keys: entries.into_iter().map(|e| e.key).collect(),
    })
}
