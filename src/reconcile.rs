//! Pushing local secrets to the remote store.
//!
//! There is no cheap way to ask whether a secret exists, so every key is
//! first sent as an update and only created when the update is refused.
//! A failing key never stops the run: every key gets exactly one update
//! attempt and at most one create attempt, and the outcome of each is
//! reported in a [`ReconcileReport`].

use serde::Serialize;

use crate::api::{Request, Response, Transport};
use crate::auth::AccessToken;
use crate::envfile::SecretEntry;
use crate::environment::Environment;
use crate::secrets::{ROOT_SECRET_PATH, secret_path};

/// Longest body excerpt kept for a failed key.
pub const FAILURE_EXCERPT_LEN: usize = 100;

/// Where secrets are pushed to.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub project_id: &'a str,
    pub environment: Environment,
}

/// What happened to one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Outcome {
    Updated,
    Created,
    Failed { reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed { .. })
    }
}

/// Outcome of one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub key: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Aggregate result of a push, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub outcomes: Vec<KeyOutcome>,
}

impl ReconcileReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn updated_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Updated))
    }

    pub fn created_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Created))
    }

    /// `(key, reason)` for every failed key, in input order.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.outcome {
                Outcome::Failed { reason } => Some((o.key.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

fn secret_body(target: Target<'_>, entry: &SecretEntry) -> serde_json::Value {
    serde_json::json!({
        "projectId": target.project_id,
        "environment": target.environment.as_str(),
        "secretPath": ROOT_SECRET_PATH,
        "secretValue": entry.value,
        "secretComment": entry.comment,
    })
}

fn update(
    transport: &dyn Transport,
    token: &AccessToken,
    target: Target<'_>,
    entry: &SecretEntry,
) -> Response {
    let request = Request::patch(secret_path(&entry.key))
        .bearer(token.as_str())
        .json(secret_body(target, entry));
    transport.execute(&request)
}

fn create(
    transport: &dyn Transport,
    token: &AccessToken,
    target: Target<'_>,
    entry: &SecretEntry,
) -> Response {
    let mut body = secret_body(target, entry);
    body["secretKey"] = serde_json::Value::String(entry.key.clone());
    let request = Request::post(secret_path(&entry.key))
        .bearer(token.as_str())
        .json(body);
    transport.execute(&request)
}

/// Update-then-create a single key.
pub fn reconcile_one(
    transport: &dyn Transport,
    token: &AccessToken,
    target: Target<'_>,
    entry: &SecretEntry,
) -> Outcome {
    let updated = update(transport, token, target, entry);
    if updated.is_success() {
        tracing::debug!(key = %entry.key, "updated secret");
        return Outcome::Updated;
    }
    tracing::debug!(key = %entry.key, status = updated.status, "update refused, creating");

    let created = create(transport, token, target, entry);
    if created.is_success() {
        tracing::debug!(key = %entry.key, "created secret");
        return Outcome::Created;
    }

    tracing::warn!(key = %entry.key, status = created.status, "failed to push secret");
    Outcome::Failed {
        reason: format!(
            "HTTP {}: {}",
            created.status,
            created.excerpt(FAILURE_EXCERPT_LEN)
        ),
    }
}

/// Push every entry, in order, and report the outcome of each.
pub fn reconcile(
    transport: &dyn Transport,
    token: &AccessToken,
    target: Target<'_>,
    entries: &[SecretEntry],
) -> ReconcileReport {
    let outcomes = entries
        .iter()
        .map(|entry| KeyOutcome {
            key: entry.key.clone(),
            outcome: reconcile_one(transport, token, target, entry),
        })
        .collect();
    let report = ReconcileReport { outcomes };
    tracing::info!(
        updated = report.updated_count(),
        created = report.created_count(),
        failed = report.failure_count(),
        "reconciliation finished"
    );
    report
}
