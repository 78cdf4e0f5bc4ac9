//! Integration tests for `infisync pull` and `infisync push`.
//!
//! Nothing here reaches a real Infisical instance: tests either fail before
//! any request is made or point the API at a closed local port.

mod common;

use common::TestEnv;
use predicates::prelude::*;

/// Nothing listens here, so every request fails at the transport level.
const UNREACHABLE_API: &str = "http://127.0.0.1:1";

#[test]
fn test_pull_without_credentials() {
    let env = TestEnv::bound("p1", "dev");

    env.infisync()
        .arg("pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("INFISICAL_CLIENT_ID"));
}

#[test]
fn test_pull_without_binding() {
    let env = TestEnv::new();

    env.infisync_with_credentials()
        .arg("pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("infisync init"));
}

#[test]
fn test_pull_authentication_failure_keeps_env_file() {
    let env = TestEnv::bound("p1", "dev");
    env.write(".env", "KEEP=me\n");

    env.infisync_with_credentials()
        .env("INFISICAL_API_URL", UNREACHABLE_API)
        .arg("pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed: HTTP 0"));

    assert_eq!(env.read(".env"), "KEEP=me\n");
}

#[test]
fn test_pull_reads_credentials_from_env_file() {
    let env = TestEnv::bound("p1", "dev");
    env.write(
        ".env",
        &format!(
            "INFISICAL_CLIENT_ID=from-file\nINFISICAL_CLIENT_SECRET=from-file\nINFISICAL_API_URL={UNREACHABLE_API}\n"
        ),
    );

    // Credentials are found, so the failure is the login, not their absence.
    env.infisync()
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn test_pull_json_error() {
    let env = TestEnv::new();

    env.infisync_with_credentials()
        .args(["--json", "pull"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""error""#));
}

#[test]
fn test_push_missing_env_file() {
    let env = TestEnv::bound("p1", "dev");

    env.infisync_with_credentials()
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Env file not found"));
}

#[test]
fn test_push_only_configuration_keys() {
    let env = TestEnv::bound("p1", "dev");
    env.write(".env", "# Infisync configuration\nINFISICAL_ENV=dev\n\n");

    // No credentials needed: nothing is sent.
    env.infisync()
        .arg("push-secrets")
        .assert()
        .success()
        .stdout(predicate::str::contains("No secrets found"));
}

#[test]
fn test_push_custom_file_authentication_failure() {
    let env = TestEnv::bound("p1", "dev");
    env.write("secrets.env", "A=1\n");

    env.infisync_with_credentials()
        .env("INFISICAL_API_URL", UNREACHABLE_API)
        .args(["push", "--file", "secrets.env"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn test_working_dir_flag() {
    let env = TestEnv::bound("p1", "dev");
    env.write(".env", "INFISICAL_ENV=dev\n");
    let elsewhere = TestEnv::new();

    elsewhere
        .infisync()
        .arg("-C")
        .arg(env.path())
        .arg("push")
        .assert()
        .success()
        .stdout(predicate::str::contains("No secrets found"));
}
