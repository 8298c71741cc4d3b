//! CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod installation;
mod logging;

use clap::{Args, Parser, Subcommand};
use commands::{ConfigScope, run_check, run_diff, run_push};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode, pretty_json};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use supaconf_adapters::{HttpManagementApi, HttpManagementApiConfig, LocalFileSystem};
use supaconf_app::UpdateRemoteConfigDeps;
use supaconf_config::LoadEnv;
use supaconf_ports::SharedManagementApi;
use supaconf_shared::RequestContext;

const ACCESS_TOKEN_ENV: &str = "SUPABASE_ACCESS_TOKEN";
const API_URL_ENV: &str = "SUPABASE_API_URL";

#[derive(Debug, Parser)]
#[command(
    name = "supaconf",
    version,
    about = "Check, diff, and push declarative project config",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// Path to `config.toml`. Defaults to `supabase/config.toml`.
    #[arg(long, default_value = ".")]
    config: PathBuf,
    /// Remote override to apply, by name or project ref.
    #[arg(long)]
    remote: Option<String>,
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Load and validate the config.
    Check {
        #[command(flatten)]
        target: TargetArgs,
        /// Print the fully resolved config as TOML.
        #[arg(long)]
        eject: bool,
    },
    /// Show how the hosted project differs from the local config.
    Diff {
        #[command(flatten)]
        target: TargetArgs,
        /// Hosted project to compare against.
        #[arg(long)]
        project_ref: Option<String>,
    },
    /// Push local config to the hosted project.
    Push {
        #[command(flatten)]
        target: TargetArgs,
        /// Hosted project to update.
        #[arg(long)]
        project_ref: Option<String>,
        /// Only push these sections (repeatable).
        #[arg(long = "only", value_name = "SECTION")]
        only: Vec<String>,
    },
}

#[derive(Debug)]
pub(crate) struct CliOutput {
    stdout: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.output.quiet, cli.output.verbose);
    let mode = OutputMode::from_args(&cli.output);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => return exit_with_error(mode, &CliError::Io(error)),
    };
    let env = LoadEnv::from_std_env();

    match runtime.block_on(run(&cli.command, mode, &env)) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(mode, &error),
        },
        Err(error) => exit_with_error(mode, &error),
    }
}

fn exit_with_error(mode: OutputMode, error: &CliError) -> std::process::ExitCode {
    if mode.is_json() {
        let payload = match error {
            CliError::Envelope(envelope) => serde_json::json!({
                "status": "error",
                "error": envelope,
            }),
            other => serde_json::json!({
                "status": "error",
                "error": { "message": other.to_string() },
            }),
        };
        if let Ok(rendered) = pretty_json(&payload) {
            let _ = io::stdout().write_all(rendered.as_bytes());
        }
    } else {
        let _ = writeln!(io::stderr(), "error: {error}");
    }
    std::process::ExitCode::from(error.exit_code().as_u8())
}

async fn run(command: &Commands, mode: OutputMode, env: &LoadEnv) -> Result<CliOutput, CliError> {
    let fs = LocalFileSystem::new();
    let ctx = RequestContext::new_run();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; cancelling");
            interrupt.cancel();
        }
    });

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Check { target, eject } => {
                run_check(mode, scope_for(&fs, env, target), *eject)
            },
            ConfigCommands::Diff {
                target,
                project_ref,
            } => {
                let deps = UpdateRemoteConfigDeps {
                    api: management_api(env)?,
                };
                let scope = scope_for(&fs, env, target);
                run_diff(&ctx, mode, scope, &deps, project_ref.as_deref()).await
            },
            ConfigCommands::Push {
                target,
                project_ref,
                only,
            } => {
                let deps = UpdateRemoteConfigDeps {
                    api: management_api(env)?,
                };
                let scope = scope_for(&fs, env, target);
                run_push(&ctx, mode, scope, &deps, project_ref.as_deref(), only).await
            },
        },
    }
}

fn scope_for<'a>(
    fs: &'a LocalFileSystem,
    env: &'a LoadEnv,
    target: &'a TargetArgs,
) -> ConfigScope<'a> {
    ConfigScope {
        fs,
        env,
        config_path: &target.config,
        remote: target.remote.as_deref(),
    }
}

fn management_api(env: &LoadEnv) -> Result<SharedManagementApi, CliError> {
    let token = env.get_non_empty(ACCESS_TOKEN_ENV).ok_or_else(|| {
        CliError::InvalidInput(format!("{ACCESS_TOKEN_ENV} is not set"))
    })?;
    let mut config = HttpManagementApiConfig::new(token);
    if let Some(url) = env.get_non_empty(API_URL_ENV) {
        config = config.with_base_url(url);
    }
    Ok(Arc::new(HttpManagementApi::new(&config)?))
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
