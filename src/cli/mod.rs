//! CLI argument definitions for Infisync.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::commands::DEFAULT_ENV_FILE;
use crate::commands::call::DEFAULT_CALL_URL;

/// Version string including build metadata.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("INFISYNC_GIT_COMMIT"),
    " ",
    env!("INFISYNC_BUILD_TIMESTAMP"),
    ")"
);

/// Infisync - keep a local .env file in sync with an Infisical project.
///
/// Bind a directory with `infisync init`, then `infisync pull` and
/// `infisync push` to move secrets in either direction.
#[derive(Parser, Debug)]
#[command(name = "infisync")]
#[command(author, version = VERSION, about = "Sync a local .env file with an Infisical project", long_about = None)]
pub struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Run as if infisync was started in <path> instead of the current directory.
    #[arg(short = 'C', long = "dir", global = true, env = "INFISYNC_DIR")]
    pub working_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new Infisical project and bind this directory to it
    #[command(alias = "create-project")]
    Init {
        /// Project name (prompted for when omitted on a terminal)
        #[arg(long)]
        name: Option<String>,

        /// Environment: dev, staging or prod (other spellings are normalized)
        #[arg(long)]
        env: Option<String>,
    },

    /// Replace the local env file with the project's secrets
    #[command(aliases = ["sync", "infisical-secrets"])]
    Pull {
        /// Environment override (defaults to the bound environment)
        #[arg(long)]
        env: Option<String>,

        /// Env file to write
        #[arg(long, default_value = DEFAULT_ENV_FILE)]
        output: PathBuf,
    },

    /// Update or create every secret of the local env file remotely
    #[command(alias = "push-secrets")]
    Push {
        /// Environment override (defaults to the bound environment)
        #[arg(long)]
        env: Option<String>,

        /// Env file to read
        #[arg(long, default_value = DEFAULT_ENV_FILE)]
        file: PathBuf,
    },

    /// POST a note to a URL and print the raw response
    Call {
        /// Target URL
        #[arg(long, default_value = DEFAULT_CALL_URL)]
        url: String,

        /// Note sent as {"note": ...}
        #[arg(long, default_value = "hello")]
        note: String,

        /// Bearer token (INFISYNC_TOKEN takes precedence)
        #[arg(long)]
        token: Option<String>,
    },
}
