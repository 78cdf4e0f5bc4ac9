//! Configuration for Infisync.
//!
//! Two kinds of configuration exist:
//!
//! ## Settings - process environment (optionally seeded from `.env`)
//!
//! - `INFISICAL_CLIENT_ID` / `INFISICAL_CLIENT_SECRET` - machine identity
//! - `INFISICAL_API_URL` - API origin override
//! - `INFISICAL_ENV` - default environment for `init`
//! - `INFISYNC_TOKEN` - bearer token for `call`
//! - `INFISYNC_ACTION_LOG` / `INFISYNC_ACTION_LOG_PATH` - action log control
//!
//! ## Binding - per-directory project file
//!
//! `.infisical.json` (or the legacy `.infisical.workspace.json`) records which
//! project and environment the directory syncs with.
//!
//! Use the [`resolver`] module for precedence between the two.

pub mod binding;
pub mod resolver;

pub use binding::{LEGACY_FILE, PRIMARY_FILE, ProjectBinding};
pub use resolver::{ActionLogSettings, CALL_TOKEN_ENV, Resolved, Settings, ValueSource};
