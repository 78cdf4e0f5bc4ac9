//! Infisync - keep a local `.env` file in sync with an Infisical project.
//!
//! This library provides the core functionality for the `infisync` CLI tool:
//! authentication, project binding resolution, env file handling and the
//! pull/push synchronization flows.

pub mod action_log;
pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod envfile;
pub mod environment;
pub mod project;
pub mod reconcile;
pub mod secrets;
pub mod sys;


/// Library-level error type for Infisync operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Missing credentials: INFISICAL_CLIENT_ID and INFISICAL_CLIENT_SECRET must be set (environment or .env)"
    )]
    MissingCredentials,

    #[error("No project configuration found in {0}: run `infisync init --name=<project>` first")]
    NotBound(std::path::PathBuf),

    #[error("Authentication failed: HTTP {status}\n{body}")]
    AuthenticationFailed { status: u16, body: String },

    #[error("Failed to {operation}: HTTP {status}\n{body}")]
    RemoteRejected {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Env file not found: {0}")]
    EnvFileNotFound(std::path::PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Infisync operations.
pub type Result<T> = std::result::Result<T, Error>;
