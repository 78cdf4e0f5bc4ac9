//! `infisync init`: create a project and bind the working directory to it.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::api::Transport;
use crate::commands::{Context, Output};
use crate::config::{ProjectBinding, ValueSource, binding};
use crate::environment::{self, Environment};
use crate::{Error, Result, auth, project};

/// Options for `init`.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub name: Option<String>,
    pub environment: Option<String>,
}

/// Result of a successful init.
#[derive(Debug, Serialize)]
pub struct InitResult {
    pub project_id: String,
    pub project_name: String,
    pub slug: String,
    pub environment: Environment,
    /// Where the environment choice came from (`cli`, `prompt`, ...)
    pub environment_source: String,
    pub config_path: PathBuf,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Created project {} ({})\n  Project ID:  {}\n  Environment: {}\n  Saved to:    {}",
            self.project_name,
            self.slug,
            self.project_id,
            self.environment,
            self.config_path.display()
        )
    }
}

/// Read the project name from the operator.
fn prompt_name(input: &mut dyn BufRead) -> Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "Project name: ")?;
    stderr.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Create a project and write the binding file.
///
/// `input` is the operator's terminal when running interactively; without
/// it a missing `--name` is an error and a missing environment means `dev`.
pub fn init<T, F>(
    ctx: &Context,
    opts: &InitOptions,
    mut input: Option<&mut dyn BufRead>,
    connect: F,
) -> Result<InitResult>
where
    T: Transport,
    F: FnOnce(&str) -> T,
{
    let name = match (&opts.name, input.as_deref_mut()) {
        (Some(name), _) => name.trim().to_string(),
        (None, Some(reader)) => prompt_name(reader)?,
        (None, None) => String::new(),
    };
    if name.is_empty() {
        return Err(Error::InvalidInput(
            "project name is required, use --name=\"Project Name\"".to_string(),
        ));
    }

    let credential = ctx.settings.credential()?;
    let environment = ctx.settings.initial_environment(
        opts.environment.as_deref(),
        input.map(|reader| move || environment::prompt(reader, &mut std::io::stderr())),
    )?;
    if environment.source == ValueSource::Default {
        tracing::info!("no environment given, defaulting to dev");
    }

    let api_url = ctx.settings.api_url(None);
    let transport = connect(&api_url.value);
    let token = auth::authenticate(&transport, &credential)?;

    let now = Utc::now();
    let created = project::create(&transport, &token, &name, now.timestamp())?;

    let new_binding = ProjectBinding {
        environment: environment.value,
        api_url: Some(api_url.value),
        project_name: Some(created.name.clone()),
        slug: Some(created.slug.clone()),
        created_at: Some(now.to_rfc3339()),
        ..ProjectBinding::new(created.id.clone())
    };
    let path = binding::save(&ctx.working_dir, &new_binding)?;

    Ok(InitResult {
        project_id: created.id,
        project_name: created.name,
        slug: created.slug,
        environment: environment.value,
        environment_source: environment.source.to_string(),
        config_path: path,
    })
}
