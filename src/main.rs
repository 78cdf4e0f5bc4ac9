//! Infisync CLI - keep a local .env file in sync with an Infisical project.

use clap::Parser;
use infisync::action_log;
use infisync::api::HttpTransport;
use infisync::cli::{Cli, Commands};
use infisync::commands::{
    self, CallOptions, Context, InitOptions, Output, PullOptions, PushOptions,
};
use infisync::config::Settings;
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    init_tracing(cli.verbose);

    let working_dir = match resolve_working_dir(cli.working_dir) {
        Ok(dir) => dir,
        Err(e) => exit_with_error(&e, json),
    };

    // Variables already in the process environment win over the .env file.
    match dotenvy::from_path(working_dir.join(".env")) {
        Ok(()) => tracing::debug!("loaded .env from {}", working_dir.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "could not load .env"),
    }

    let ctx = Context::new(working_dir, Settings::from_env());

    let (cmd_name, args_json) = serialize_command(&cli.command);
    let start = Instant::now();

    let result = run_command(cli.command, &ctx, json);

    let duration = start.elapsed().as_millis() as u64;
    let error = match &result {
        Ok(Completion::Success) => None,
        Ok(Completion::Unsuccessful(reason)) => Some(reason.clone()),
        Err(e) => Some(e.to_string()),
    };
    action_log::log_action(
        &ctx.settings.action_log,
        &ctx.working_dir,
        &cmd_name,
        args_json,
        error,
        duration,
    );

    match result {
        Ok(Completion::Success) => {}
        Ok(Completion::Unsuccessful(_)) => process::exit(1),
        Err(e) => exit_with_error(&e, json),
    }
}

/// How a command that produced output ended.
enum Completion {
    Success,
    /// Output was printed but the process should still exit non-zero
    Unsuccessful(String),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve the directory commands operate on: -C/--dir, INFISYNC_DIR, or the cwd.
fn resolve_working_dir(explicit: Option<PathBuf>) -> Result<PathBuf, infisync::Error> {
    match explicit {
        Some(path) if path.is_dir() => Ok(path),
        Some(path) => Err(infisync::Error::InvalidInput(format!(
            "directory does not exist: {}",
            path.display()
        ))),
        None => Ok(std::env::current_dir()?),
    }
}

fn exit_with_error(error: &infisync::Error, json: bool) -> ! {
    if json {
        eprintln!("{}", serde_json::json!({ "error": error.to_string() }));
    } else {
        eprintln!("Error: {}", error);
    }
    process::exit(1);
}

fn run_command(
    command: Commands,
    ctx: &Context,
    json: bool,
) -> Result<Completion, infisync::Error> {
    match command {
        Commands::Init { name, env } => {
            let opts = InitOptions {
                name,
                environment: env,
            };
            let stdin = std::io::stdin();
            let result = if stdin.is_terminal() {
                let mut lock = stdin.lock();
                commands::init(ctx, &opts, Some(&mut lock as &mut dyn BufRead), HttpTransport::new)?
            } else {
                commands::init(ctx, &opts, None, HttpTransport::new)?
            };
            output(&result, json);
        }

        Commands::Pull { env, output: file } => {
            let opts = PullOptions {
                environment: env,
                output: file,
            };
            let result = commands::pull(ctx, &opts, HttpTransport::new)?;
            output(&result, json);
        }

        Commands::Push { env, file } => {
            let opts = PushOptions {
                environment: env,
                file,
            };
            let result = commands::push(ctx, &opts, HttpTransport::new)?;
            output(&result, json);
            if result.failure_count > 0 {
                tracing::warn!(failed = result.failure_count, "some secrets were not pushed");
            }
        }

        Commands::Call { url, note, token } => {
            let opts = CallOptions { url, note, token };
            let result = commands::call(ctx, &opts, HttpTransport::new);
            output(&result, json);
            if !result.is_success() {
                return Ok(Completion::Unsuccessful(format!("HTTP {}", result.status)));
            }
        }
    }
    Ok(Completion::Success)
}

fn output<T: Output>(result: &T, json: bool) {
    if json {
        println!("{}", result.to_json());
    } else {
        println!("{}", result.to_human());
    }
}

/// Command name and loggable arguments for the action log.
fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    match command {
        Commands::Init { name, env } => (
            "init".to_string(),
            serde_json::json!({ "name": name, "env": env }),
        ),
        Commands::Pull { env, output } => (
            "pull".to_string(),
            serde_json::json!({ "env": env, "output": path_arg(output) }),
        ),
        Commands::Push { env, file } => (
            "push".to_string(),
            serde_json::json!({ "env": env, "file": path_arg(file) }),
        ),
        Commands::Call { url, note, token } => (
            "call".to_string(),
            serde_json::json!({ "url": url, "note": note, "token": token }),
        ),
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
