//! `infisync push`: send every local secret to the bound project.
//!
//! Individual keys may fail without failing the command; callers read
//! `failure_count` to detect a partial push.

use std::path::PathBuf;

use serde::Serialize;

use crate::api::Transport;
use crate::commands::{Context, Output};
use crate::config::binding;
use crate::environment::Environment;
use crate::reconcile::{self, ReconcileReport, Target};
use crate::{Result, auth, envfile};

/// Options for `push`.
#[derive(Debug, Clone)]
pub struct PushOptions {
    /// Environment override; the binding's environment otherwise
    pub environment: Option<String>,
    /// Env file to read, relative to the working directory
    pub file: PathBuf,
}

/// Result of a push.
#[derive(Debug, Serialize)]
pub struct PushResult {
    pub file: PathBuf,
    /// `None` when there was nothing to push and no project was consulted
    pub project_id: Option<String>,
    pub environment: Option<Environment>,
    pub success_count: usize,
    pub failure_count: usize,
    #[serde(flatten)]
    pub report: ReconcileReport,
}

impl PushResult {
    fn nothing_to_push(file: PathBuf) -> Self {
        Self {
            file,
            project_id: None,
            environment: None,
            success_count: 0,
            failure_count: 0,
            report: ReconcileReport::default(),
        }
    }
}

impl Output for PushResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let (Some(project_id), Some(environment)) = (&self.project_id, &self.environment) else {
            return format!("No secrets found in {} to push.", self.file.display());
        };

        let mut lines = vec![format!(
            "Pushed {} of {} secrets to project {} ({}): {} updated, {} created, {} failed",
            self.success_count,
            self.report.outcomes.len(),
            project_id,
            environment,
            self.report.updated_count(),
            self.report.created_count(),
            self.failure_count
        )];
        for (key, reason) in self.report.failures() {
            lines.push(format!("  failed {}: {}", key, reason));
        }
        lines.join("\n")
    }
}

/// Reconcile the env file against the bound project.
pub fn push<T, F>(ctx: &Context, opts: &PushOptions, connect: F) -> Result<PushResult>
where
    T: Transport,
    F: FnOnce(&str) -> T,
{
    let entries = envfile::read(&ctx.path(&opts.file))?;
    if entries.is_empty() {
        tracing::info!(file = %opts.file.display(), "no secrets to push");
        return Ok(PushResult::nothing_to_push(opts.file.clone()));
    }
    tracing::info!(count = entries.len(), "parsed env file");

    let credential = ctx.settings.credential()?;
    let binding = binding::require(&ctx.working_dir)?;
    let environment = ctx
        .settings
        .bound_environment(opts.environment.as_deref(), &binding);
    let api_url = ctx.settings.api_url(Some(&binding));

    let transport = connect(&api_url.value);
    let token = auth::authenticate(&transport, &credential)?;

    let target = Target {
        project_id: &binding.project_id,
        environment: environment.value,
    };
    let report = reconcile::reconcile(&transport, &token, target, &entries);

    Ok(PushResult {
        file: opts.file.clone(),
        project_id: Some(binding.project_id.clone()),
        environment: Some(environment.value),
        success_count: report.success_count(),
        failure_count: report.failure_count(),
        report,
    })
}
