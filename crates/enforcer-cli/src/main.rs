//! Enforcer - update compliance with a snooze limit
//!
//! Usage:
//!   enforcer run API_USER API_PASSWORD API_URL SNOOZE_LIMIT POLICY
//!   enforcer status            # Show counter and derived state
//!   enforcer reset             # Zero the snooze counter
//!
//! Positional parameters may be blank; blank values fall back to the config
//! file.

mod interactive;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enforcer_core::commands::{
    ResetCommand, ResetReport, RunCommand, StatusCommand, StatusReport,
};
use enforcer_core::config::{
    ApiSettings, ConfigStore, EnforcerConfig, ParameterOverrides, RunSettings, resolve_limit,
};
use enforcer_core::device::resolve_device;
use enforcer_core::engine::{PersistOutcome, RunReport};
use enforcer_core::error::{EXIT_FAILURE, EnforcerError};
use enforcer_core::prompt::UserDecision;

use crate::interactive::TerminalPrompt;

#[derive(Parser)]
#[command(name = "enforcer", version)]
#[command(about = "Update compliance escalation with a snooze limit", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (default: <config dir>/enforcer/enforcer.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Device serial number (default: read from the hardware registry)
    #[arg(long, global = true, value_name = "SERIAL")]
    serial: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one escalation cycle
    ///
    /// Prompts the console user when updates are pending, counts snoozes in
    /// the inventory record and triggers the update policy once the limit is
    /// reached.
    Run(RunArgs),

    /// Show pending updates, the stored counter and the derived state
    ///
    /// Read-only: nothing is prompted, written or triggered.
    Status(StatusArgs),

    /// Reset the stored snooze counter to 0
    Reset(ApiArgs),
}

#[derive(Args)]
struct ApiArgs {
    /// API account name
    #[arg(value_name = "API_USER")]
    api_user: Option<String>,

    /// API account password
    #[arg(value_name = "API_PASSWORD")]
    api_password: Option<String>,

    /// Base URL of the management server
    #[arg(value_name = "API_URL")]
    api_url: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    api: ApiArgs,

    /// Snoozes allowed before updates are forced
    #[arg(value_name = "SNOOZE_LIMIT", allow_hyphen_values = true)]
    snooze_limit: Option<String>,

    /// Policy event that installs updates
    #[arg(value_name = "POLICY")]
    policy: Option<String>,

    /// Prompt on this terminal instead of the console user's screen
    #[arg(long)]
    terminal: bool,
}

#[derive(Args)]
struct StatusArgs {
    #[command(flatten)]
    api: ApiArgs,

    /// Snoozes allowed before updates are forced
    #[arg(value_name = "SNOOZE_LIMIT", allow_hyphen_values = true)]
    snooze_limit: Option<String>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

impl ApiArgs {
    fn overrides(&self) -> ParameterOverrides {
        ParameterOverrides {
            api_username: self.api_user.clone(),
            api_password: self.api_password.clone(),
            api_url: self.api_url.clone(),
            ..ParameterOverrides::default()
        }
    }
}

impl RunArgs {
    fn overrides(&self) -> ParameterOverrides {
        ParameterOverrides {
            snooze_limit: self.snooze_limit.clone(),
            policy: self.policy.clone(),
            ..self.api.overrides()
        }
    }
}

impl StatusArgs {
    fn overrides(&self) -> ParameterOverrides {
        ParameterOverrides {
            snooze_limit: self.snooze_limit.clone(),
            ..self.api.overrides()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "enforcer=debug,info"
    } else {
        "enforcer=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Exit code of the first [`EnforcerError`] in the chain, else 1.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EnforcerError>())
        .map(EnforcerError::exit_code)
        .unwrap_or(EXIT_FAILURE)
}

fn run_cli(cli: Cli) -> Result<()> {
    let global = cli.global;
    let config = load_config(global.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => run_escalation(&global, &config, &args),
        Commands::Status(args) => run_status(&global, &config, &args),
        Commands::Reset(args) => run_reset(&global, &config, &args),
    }
}

/// Load the config file. Bad content exits 2, an unreadable file exits 1.
fn load_config(path: Option<&Path>) -> Result<EnforcerConfig> {
    let store = match path {
        Some(path) => ConfigStore::from_path(path.to_path_buf()),
        None => ConfigStore::with_defaults()?,
    };
    tracing::debug!(path = %store.config_path().display(), "Loading config");
    store.load()
}

fn run_escalation(global: &GlobalArgs, config: &EnforcerConfig, args: &RunArgs) -> Result<()> {
    let settings = RunSettings::resolve(config, &args.overrides())?;
    let device = resolve_device(global.serial.as_deref())?;
    let command = RunCommand::new(settings);

    let report = if args.terminal {
        command.execute_with_prompt(&device, &TerminalPrompt::new())?
    } else {
        command.execute(&device)?
    };

    match global.format {
        OutputFormat::Table => print_run_table(&report),
        OutputFormat::Json => print_json("run", &report)?,
    }
    Ok(())
}

fn run_status(global: &GlobalArgs, config: &EnforcerConfig, args: &StatusArgs) -> Result<()> {
    let overrides = args.overrides();
    let api = ApiSettings::resolve(config, &overrides)?;
    let limit = resolve_limit(config, &overrides)?;
    let device = resolve_device(global.serial.as_deref())?;

    let report = StatusCommand::new(api, config.updater.clone(), limit).execute(&device)?;

    match global.format {
        OutputFormat::Table => print_status_table(&report),
        OutputFormat::Json => print_json("status", &report)?,
    }
    Ok(())
}

fn run_reset(global: &GlobalArgs, config: &EnforcerConfig, args: &ApiArgs) -> Result<()> {
    let api = ApiSettings::resolve(config, &args.overrides())?;
    let device = resolve_device(global.serial.as_deref())?;

    let report = ResetCommand::new(api).execute(&device)?;

    match global.format {
        OutputFormat::Table => print_reset_table(&report),
        OutputFormat::Json => print_json("reset", &report)?,
    }
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_json<T: serde::Serialize>(command: &str, report: &T) -> Result<()> {
    let output = serde_json::json!({
        "schema_version": 1,
        "command": command,
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_run_table(report: &RunReport) {
    println!("Device: {}", report.device);
    println!("State: {}", report.state);
    print_pending(&report.pending);

    let counter = if report.counter_defaulted {
        format!("{} (stored value unreadable)", report.counter_before)
    } else {
        report.counter_before.to_string()
    };
    println!("Snoozes: {} of {}", counter, report.snooze_limit);

    if let Some(decision) = report.decision {
        let decision = match decision {
            UserDecision::Proceed => "update now",
            UserDecision::Defer => "snooze",
        };
        println!("Decision: {}", decision);
    }
    if report.triggered {
        println!("Update policy: triggered");
    }

    match report.persisted {
        PersistOutcome::Written => println!("Counter: set to {}", report.counter_after),
        PersistOutcome::Failed => println!(
            "Counter: could not store {} (see log)",
            report.counter_after
        ),
        PersistOutcome::Skipped => println!("Counter: unchanged"),
    }
}

fn print_status_table(report: &StatusReport) {
    println!("Device: {}", report.device);
    print_pending(&report.pending);
    match (&report.counter, &report.counter_error) {
        (Some(count), _) => println!("Snoozes: {} of {}", count, report.snooze_limit),
        (None, Some(error)) => println!("Snoozes: unknown ({})", error),
        (None, None) => println!("Snoozes: unknown"),
    }
    println!("Next run: {}", report.state);
}

fn print_reset_table(report: &ResetReport) {
    let previous = report
        .previous
        .map(|count| count.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("Device: {}", report.device);
    println!("Snoozes: {} -> 0", previous);
}

fn print_pending(pending: &[String]) {
    if pending.is_empty() {
        println!("Pending updates: none");
        return;
    }
    println!("Pending updates ({}):", pending.len());
    for name in pending {
        println!("  - {}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat, exit_code_for, load_config};
    use clap::{CommandFactory, Parser};
    use enforcer_core::error::{EnforcerError, StoreError};
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_takes_positional_parameters() {
        let cli = Cli::try_parse_from([
            "enforcer",
            "run",
            "api",
            "secret",
            "https://company.jamfcloud.com",
            "3",
            "runSoftwareUpdates",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.api_username.as_deref(), Some("api"));
        assert_eq!(overrides.snooze_limit.as_deref(), Some("3"));
        assert_eq!(overrides.policy.as_deref(), Some("runSoftwareUpdates"));
        assert!(!args.terminal);
    }

    #[test]
    fn run_accepts_blank_and_negative_parameters() {
        let cli = Cli::try_parse_from([
            "enforcer",
            "run",
            "",
            "",
            "",
            "-1",
            "runSoftwareUpdates",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.snooze_limit.as_deref(), Some("-1"));
        assert_eq!(args.api.api_user.as_deref(), Some(""));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "enforcer",
            "status",
            "--serial",
            "C02TEST0001",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.global.serial.as_deref(), Some("C02TEST0001"));
        assert!(matches!(cli.global.format, OutputFormat::Json));
        assert!(cli.global.verbose);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let prompt = anyhow::Error::from(EnforcerError::PromptSurface("no session".into()));
        assert_eq!(exit_code_for(&prompt), 3);

        let config = anyhow::Error::from(EnforcerError::InvalidConfiguration("limit".into()))
            .context("Failed to run");
        assert_eq!(exit_code_for(&config), 2);

        let store = anyhow::Error::from(EnforcerError::from(StoreError::Unavailable(
            "HTTP 500".into(),
        )));
        assert_eq!(exit_code_for(&store), 1);

        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn unreadable_config_exits_with_failure() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(temp.path())).unwrap_err();
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn invalid_config_exits_as_inconsistent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("enforcer.toml");
        std::fs::write(&path, "[escalation]\nsnooze_limit = \"three\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.api.timeout_secs, 60);
    }
}
