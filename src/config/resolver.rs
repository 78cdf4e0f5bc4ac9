//! Precedence resolution for runtime settings.
//!
//! The process environment is read exactly once, into [`Settings`], and the
//! resulting value is passed to every command.
//!
//! ## API URL precedence (highest to lowest)
//!
//! 1. `INFISICAL_API_URL` environment variable
//! 2. `apiUrl` in the project binding
//! 3. Built-in default (`https://app.infisical.com`)
//!
//! ## Environment precedence (highest to lowest)
//!
//! For `pull`/`push`: `--env` flag, then the binding's environment.
//! For `init`: `--env` flag, `INFISICAL_ENV`, the interactive menu, then `dev`.

use std::path::PathBuf;

use crate::Result;
use crate::api::DEFAULT_API_URL;
use crate::auth::Credential;
use crate::config::binding::ProjectBinding;
use crate::envfile::{API_URL_KEY, CLIENT_ID_KEY, CLIENT_SECRET_KEY, ENV_KEY};
use crate::environment::Environment;

/// Bearer token for the pass-through `call` command.
pub const CALL_TOKEN_ENV: &str = "INFISYNC_TOKEN";

/// Set to `0`/`false`/`no` to disable the action log.
pub const ACTION_LOG_ENV: &str = "INFISYNC_ACTION_LOG";

/// Overrides the action log location.
pub const ACTION_LOG_PATH_ENV: &str = "INFISYNC_ACTION_LOG_PATH";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from the project binding file
    Binding,
    /// Value from CLI flag
    CliFlag,
    /// Chosen interactively by the operator
    Prompt,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Binding => write!(f, "binding"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Prompt => write!(f, "prompt"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Action log configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLogSettings {
    pub enabled: bool,
    /// Explicit log file; `None` means the default location
    pub path: Option<PathBuf>,
}

impl Default for ActionLogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Everything the tool reads from its environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: Option<String>,
    pub environment: Option<String>,
    pub call_token: Option<String>,
    pub action_log: ActionLogSettings,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let action_log = ActionLogSettings {
            enabled: get(ACTION_LOG_ENV)
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            path: get(ACTION_LOG_PATH_ENV).map(PathBuf::from),
        };

        Self {
            client_id: get(CLIENT_ID_KEY),
            client_secret: get(CLIENT_SECRET_KEY),
            api_url: get(API_URL_KEY),
            environment: get(ENV_KEY),
            call_token: get(CALL_TOKEN_ENV),
            action_log,
        }
    }

    /// The machine identity credential, or [`crate::Error::MissingCredentials`].
    pub fn credential(&self) -> Result<Credential> {
        Credential::new(self.client_id.clone(), self.client_secret.clone())
    }

    /// Resolve the API origin.
    pub fn api_url(&self, binding: Option<&ProjectBinding>) -> Resolved<String> {
        if let Some(url) = &self.api_url {
            return Resolved::new(url.clone(), ValueSource::EnvVar(API_URL_KEY.to_string()));
        }
        if let Some(url) = binding.and_then(|b| b.api_url.as_ref()) {
            return Resolved::new(url.clone(), ValueSource::Binding);
        }
        Resolved::new(DEFAULT_API_URL.to_string(), ValueSource::Default)
    }

    /// Resolve the environment for an operation on an existing binding.
    pub fn bound_environment(
        &self,
        flag: Option<&str>,
        binding: &ProjectBinding,
    ) -> Resolved<Environment> {
        match flag {
            Some(raw) => Resolved::new(Environment::normalize(raw), ValueSource::CliFlag),
            None => Resolved::new(binding.environment, ValueSource::Binding),
        }
    }

    /// Resolve the environment for a new binding.
    ///
    /// `prompt` is only invoked when neither the flag nor `INFISICAL_ENV`
    /// supplies a value. A failing prompt is an error, not a silent `dev`.
    pub fn initial_environment<P>(
        &self,
        flag: Option<&str>,
        prompt: Option<P>,
    ) -> Result<Resolved<Environment>>
    where
        P: FnOnce() -> std::io::Result<Environment>,
    {
        if let Some(raw) = flag {
            return Ok(Resolved::new(Environment::normalize(raw), ValueSource::CliFlag));
        }
        if let Some(raw) = &self.environment {
            return Ok(Resolved::new(
                Environment::normalize(raw),
                ValueSource::EnvVar(ENV_KEY.to_string()),
            ));
        }
        Ok(match prompt {
            Some(ask) => Resolved::new(ask()?, ValueSource::Prompt),
            None => Resolved::new(Environment::Dev, ValueSource::Default),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    fn binding(api_url: Option<&str>, env: Environment) -> ProjectBinding {
        ProjectBinding {
            api_url: api_url.map(str::to_string),
            environment: env,
            ..ProjectBinding::new("p1")
        }
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(
            format!("{}", ValueSource::EnvVar("FOO".to_string())),
            "env:FOO"
        );
        assert_eq!(format!("{}", ValueSource::Binding), "binding");
        assert_eq!(format!("{}", ValueSource::CliFlag), "cli");
        assert_eq!(format!("{}", ValueSource::Prompt), "prompt");
        assert_eq!(format!("{}", ValueSource::Default), "default");
    }

    #[test]
    fn test_from_lookup_reads_all_keys() {
        let s = settings(&[
            ("INFISICAL_CLIENT_ID", "id"),
            ("INFISICAL_CLIENT_SECRET", "secret"),
            ("INFISICAL_API_URL", "https://vault.example.com"),
            ("INFISICAL_ENV", "prod"),
            ("INFISYNC_TOKEN", "tok"),
        ]);
        assert_eq!(s.client_id.as_deref(), Some("id"));
        assert_eq!(s.client_secret.as_deref(), Some("secret"));
        assert_eq!(s.api_url.as_deref(), Some("https://vault.example.com"));
        assert_eq!(s.environment.as_deref(), Some("prod"));
        assert_eq!(s.call_token.as_deref(), Some("tok"));
        assert!(s.action_log.enabled);
        assert!(s.action_log.path.is_none());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let s = settings(&[("INFISICAL_CLIENT_ID", ""), ("INFISICAL_CLIENT_SECRET", "  ")]);
        assert!(s.client_id.is_none());
        assert!(s.credential().is_err());
    }

    #[test]
    fn test_action_log_toggle() {
        assert!(!settings(&[("INFISYNC_ACTION_LOG", "0")]).action_log.enabled);
        assert!(!settings(&[("INFISYNC_ACTION_LOG", "false")]).action_log.enabled);
        assert!(settings(&[("INFISYNC_ACTION_LOG", "1")]).action_log.enabled);
        let s = settings(&[("INFISYNC_ACTION_LOG_PATH", "/tmp/a.log")]);
        assert_eq!(s.action_log.path, Some(PathBuf::from("/tmp/a.log")));
    }

    #[test]
    fn test_api_url_precedence() {
        let with_binding = binding(Some("https://bound.example.com"), Environment::Dev);

        let env = settings(&[("INFISICAL_API_URL", "https://env.example.com")]);
        let resolved = env.api_url(Some(&with_binding));
        assert_eq!(resolved.value, "https://env.example.com");
        assert_eq!(
            resolved.source,
            ValueSource::EnvVar("INFISICAL_API_URL".to_string())
        );

        let none = settings(&[]);
        let resolved = none.api_url(Some(&with_binding));
        assert_eq!(resolved.value, "https://bound.example.com");
        assert_eq!(resolved.source, ValueSource::Binding);

        let resolved = none.api_url(None);
        assert_eq!(resolved.value, DEFAULT_API_URL);
        assert_eq!(resolved.source, ValueSource::Default);
    }

    #[test]
    fn test_bound_environment_flag_overrides_binding() {
        let s = settings(&[]);
        let b = binding(None, Environment::Staging);

        let resolved = s.bound_environment(Some("production"), &b);
        assert_eq!(resolved.value, Environment::Prod);
        assert_eq!(resolved.source, ValueSource::CliFlag);

        let resolved = s.bound_environment(None, &b);
        assert_eq!(resolved.value, Environment::Staging);
        assert_eq!(resolved.source, ValueSource::Binding);
    }

    #[test]
    fn test_initial_environment_precedence() {
        let with_env = settings(&[("INFISICAL_ENV", "stage")]);
        let never = || -> std::io::Result<Environment> { panic!("prompt must not run") };

        let resolved = with_env.initial_environment(Some("prod"), Some(never)).unwrap();
        assert_eq!(resolved.value, Environment::Prod);

        let resolved = with_env.initial_environment(None, Some(never)).unwrap();
        assert_eq!(resolved.value, Environment::Staging);
        assert_eq!(resolved.source, ValueSource::EnvVar("INFISICAL_ENV".to_string()));

        let without = settings(&[]);
        let resolved = without
            .initial_environment(None, Some(|| Ok(Environment::Prod)))
            .unwrap();
        assert_eq!(resolved.value, Environment::Prod);
        assert_eq!(resolved.source, ValueSource::Prompt);

        let resolved = without
            .initial_environment(None, None::<fn() -> std::io::Result<Environment>>)
            .unwrap();
        assert_eq!(resolved.value, Environment::Dev);
        assert_eq!(resolved.source, ValueSource::Default);
    }

    #[test]
    fn test_initial_environment_prompt_failure() {
        let failing = || -> std::io::Result<Environment> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        };

        let err = settings(&[]).initial_environment(None, Some(failing)).unwrap_err();

        assert!(matches!(err, crate::Error::Io(_)));
    }
}
