//! Action logging for Infisync commands.
//!
//! Every invocation is appended as one JSON line to
//! `~/.local/share/infisync/action.log` (or `INFISYNC_ACTION_LOG_PATH`).
//! Arguments are sanitized first: anything that looks like a token or
//! secret is redacted and paths are reduced to their file name.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ActionLogSettings;

/// Longest string kept verbatim in a logged argument.
const MAX_ARG_LEN: usize = 100;

/// Represents a single action log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// ISO 8601 timestamp when the action occurred
    pub timestamp: DateTime<Utc>,

    /// Directory the command ran against
    pub working_dir: String,

    /// Command name (e.g., "pull", "push")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub duration_ms: u64,

    /// User who executed the command
    pub user: String,
}

/// Log an action according to `settings`.
///
/// Logging problems never fail the command; they are reported as warnings.
pub fn log_action(
    settings: &ActionLogSettings,
    working_dir: &Path,
    command: &str,
    args: serde_json::Value,
    error: Option<String>,
    duration_ms: u64,
) {
    if !settings.enabled {
        return;
    }

    let Some(path) = settings.path.clone().or_else(default_log_path) else {
        tracing::warn!("could not determine action log path");
        return;
    };

    let entry = ActionLog {
        timestamp: Utc::now(),
        working_dir: working_dir.to_string_lossy().to_string(),
        command: command.to_string(),
        args: sanitize_args(&args),
        success: error.is_none(),
        error,
        duration_ms,
        user: current_user(),
    };

    if let Err(e) = write_log_entry(&path, &entry) {
        tracing::warn!(path = %path.display(), error = %e, "failed to write action log");
    }
}

/// Default path: ~/.local/share/infisync/action.log
fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".local/share/infisync/action.log"))
}

fn write_log_entry(path: &Path, entry: &ActionLog) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase();
    ["token", "secret", "password", "value"]
        .iter()
        .any(|word| key.contains(word))
}

/// Sanitize arguments to remove sensitive data.
fn sanitize_args(args: &serde_json::Value) -> serde_json::Value {
    match args {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let clean = if is_sensitive(key) && !value.is_null() {
                        serde_json::Value::String("[REDACTED]".to_string())
                    } else {
                        sanitize_args(value)
                    };
                    (key.clone(), clean)
                })
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sanitize_args).collect())
        }
        serde_json::Value::String(s) => {
            // URLs are kept whole; anything else with a separator is a path.
            let s = if !s.contains("://") && (s.contains('/') || s.contains('\\')) {
                s.rsplit(['/', '\\']).next().unwrap_or(s)
            } else {
                s.as_str()
            };
            let len = s.chars().count();
            if len > MAX_ARG_LEN {
                let head: String = s.chars().take(MAX_ARG_LEN - 3).collect();
                serde_json::Value::String(format!("{}... ({} chars)", head, len))
            } else {
                serde_json::Value::String(s.to_string())
            }
        }
        _ => args.clone(),
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
