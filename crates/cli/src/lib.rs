pub mod commands;
pub mod render;

use clap::{Parser, Subcommand};
use renewlens_core::config::LoggingConfig;
use std::process::ExitCode;

use crate::commands::report::ReportArgs;
use crate::commands::GlobalArgs;

#[derive(Debug, Parser)]
#[command(
    name = "renewlens",
    about = "Renewal retention and workload dashboard",
    long_about = "Pull renewal opportunities from Salesforce and report retention by business line, account manager win rates, and weighted workload.",
    after_help = "Examples:\n  renewlens report --preset last_30_days\n  renewlens report --start 2024-01-01 --end 2024-03-31 --lines Auto,Flood --json\n  renewlens doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Fetch renewals and render the retention, win rate, and workload dashboard")]
    Report(ReportArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and Salesforce login readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the stage and business type classification tables")]
    Reference {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Report(args) => commands::report::run(args, &cli.global),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&cli.global) }
        }
        Command::Doctor { json } => commands::CommandResult {
            exit_code: 0,
            output: commands::doctor::run(json, &cli.global),
        },
        Command::Reference { json } => commands::CommandResult {
            exit_code: 0,
            output: commands::reference::run(json, &cli.global),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber on stderr so stdout carries only command output.
pub fn init_logging(logging: &LoggingConfig) {
    use renewlens_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    // A second command in the same process keeps the first subscriber.
    let _ = match logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}
