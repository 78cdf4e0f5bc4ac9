//! Common test utilities for infisync integration tests.
//!
//! Provides `TestEnv`, a scratch working directory plus a command builder
//! that never touches the user's action log or picks up ambient Infisical
//! credentials from the test runner's environment.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// Environment variables that would leak the caller's configuration into a test.
const AMBIENT_VARS: &[&str] = &[
    "INFISICAL_CLIENT_ID",
    "INFISICAL_CLIENT_SECRET",
    "INFISICAL_API_URL",
    "INFISICAL_PROJECT_ID",
    "INFISICAL_ENV",
    "INFISYNC_TOKEN",
    "INFISYNC_DIR",
    "RUST_LOG",
];

/// An isolated working directory for one test.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// A bound directory using the primary config file.
    pub fn bound(project_id: &str, environment: &str) -> Self {
        let env = Self::new();
        env.write(
            ".infisical.json",
            &format!(r#"{{"projectId":"{project_id}","environment":"{environment}"}}"#),
        );
        env
    }

    /// Get a Command for the infisync binary running in the test directory.
    pub fn infisync(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_infisync"));
        cmd.current_dir(self.dir.path());
        for var in AMBIENT_VARS {
            cmd.env_remove(var);
        }
        cmd.env("INFISYNC_ACTION_LOG", "0");
        cmd
    }

    /// Same as `infisync()` with a credential pair set.
    pub fn infisync_with_credentials(&self) -> Command {
        let mut cmd = self.infisync();
        cmd.env("INFISICAL_CLIENT_ID", "test-id");
        cmd.env("INFISICAL_CLIENT_SECRET", "test-secret");
        cmd
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.dir.path().join(name), contents).unwrap();
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
