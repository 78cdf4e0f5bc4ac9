//! Reading and writing flat `KEY=VALUE` env files.
//!
//! The format is deliberately loose: blank lines and `#` comments are ignored,
//! everything after the first `=` is the value, and there is no quoting or
//! escaping. A value containing a newline cannot be represented.
//!
//! Keys the tool itself is configured through ([`RESERVED_KEYS`]) are never
//! treated as secrets in either direction.

use std::path::Path;

use crate::{Error, Result};

/// Client id variable used for authentication.
pub const CLIENT_ID_KEY: &str = "INFISICAL_CLIENT_ID";
/// Client secret variable used for authentication.
pub const CLIENT_SECRET_KEY: &str = "INFISICAL_CLIENT_SECRET";
/// API origin override.
pub const API_URL_KEY: &str = "INFISICAL_API_URL";
/// Project id written into the snapshot of a pulled file.
pub const PROJECT_ID_KEY: &str = "INFISICAL_PROJECT_ID";
/// Default environment.
pub const ENV_KEY: &str = "INFISICAL_ENV";

/// Configuration keys excluded from the secret set.
pub const RESERVED_KEYS: &[&str] = &[
    CLIENT_ID_KEY,
    CLIENT_SECRET_KEY,
    API_URL_KEY,
    PROJECT_ID_KEY,
    ENV_KEY,
];

/// Header written at the top of every pulled file.
pub const DEFAULT_HEADER: &str = "Generated by infisync. Local edits are overwritten on pull.";

/// Returns true if `key` is one of the tool's own configuration keys.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A single secret as it appears in an env file or in the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    pub key: String,
    pub value: String,
    /// Remote-side comment; env files carry none
    pub comment: String,
}

impl SecretEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: String::new(),
        }
    }
}

/// Split one line into a trimmed `(key, value)` pair.
///
/// Returns `None` for blank lines, comments, lines without `=`, and lines
/// with an empty key.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// Parse env file text into secrets, in file order.
///
/// Reserved keys are dropped. When a key repeats, the last value wins and
/// the entry sits at the position of its last occurrence.
pub fn parse(text: &str) -> Vec<SecretEntry> {
    let mut entries: Vec<SecretEntry> = Vec::new();
    for (key, value) in text.lines().filter_map(split_line) {
        if is_reserved(key) {
            continue;
        }
        entries.retain(|e| e.key != key);
        entries.push(SecretEntry::new(key, value));
    }
    entries
}

/// Reserved `(key, value)` pairs found in `text`, last occurrence winning.
///
/// Used to carry the operator's own configuration lines across a pull.
pub fn parse_reserved(text: &str) -> Vec<(String, String)> {
    let mut found: Vec<(String, String)> = Vec::new();
    for (key, value) in text.lines().filter_map(split_line) {
        if !is_reserved(key) {
            continue;
        }
        found.retain(|(k, _)| k != key);
        found.push((key.to_string(), value.to_string()));
    }
    found
}

/// Render secrets as env file text.
///
/// Layout: the header as `#` comment lines, the configuration snapshot as
/// `KEY=VALUE` lines, one blank line, then the secrets in input order.
/// Reserved keys are never written into the secrets section.
pub fn serialize(entries: &[SecretEntry], header: &str, snapshot: &[(String, String)]) -> String {
    let mut out = String::new();
    for line in header.lines() {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
    if !snapshot.is_empty() {
        out.push_str("# Infisync configuration\n");
        for (key, value) in snapshot {
            out.push_str(&format!("{}={}\n", key, value));
        }
    }
    out.push('\n');
    out.push_str("# Application secrets\n");
    for entry in entries.iter().filter(|e| !is_reserved(&e.key)) {
        out.push_str(&format!("{}={}\n", entry.key, entry.value));
    }
    out
}

/// Read and parse an env file.
pub fn read(path: &Path) -> Result<Vec<SecretEntry>> {
    if !path.exists() {
        return Err(Error::EnvFileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse(&text))
}
