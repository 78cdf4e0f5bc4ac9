//! Command implementations for the Infisync CLI.
//!
//! Each command takes a [`Context`] (working directory plus settings read
//! once at startup) and a `connect` function that builds a [`Transport`]
//! for a given API origin, and returns a result that can be printed as
//! JSON or human-readable text:
//! - `init` - create a remote project and bind the directory to it
//! - `pull` - overwrite the env file with the remote secrets
//! - `push` - update or create every local secret remotely
//! - `call` - POST a note to an arbitrary URL
//!
//! [`Transport`]: crate::api::Transport

pub mod call;
pub mod init;
pub mod pull;
pub mod push;

use std::path::PathBuf;

use crate::config::Settings;

pub use call::{CallOptions, CallResult, call};
pub use init::{InitOptions, InitResult, init};
pub use pull::{PullOptions, PullResult, pull};
pub use push::{PushOptions, PushResult, push};

/// Default env file, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Per-invocation inputs shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub working_dir: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn new(working_dir: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            working_dir: working_dir.into(),
            settings,
        }
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn path(&self, relative: &std::path::Path) -> PathBuf {
        self.working_dir.join(relative)
    }
}

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}
