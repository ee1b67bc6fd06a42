//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands, ConfigArgs, ConfigCommands, RunArgs};
use clap::Parser;

use crate::config::Config;
use crate::logging;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let command = cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default()));

    // Load configuration (the file may not exist yet when locating or creating it)
    let config = match &command {
        Commands::Config(ConfigArgs {
            command: ConfigCommands::Init { .. } | ConfigCommands::Path,
        }) => Config::default(),
        _ => Config::load(cli.config.as_deref())?,
    };

    // Determine output format
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    // Only full runs keep a log file.
    let log_file = match &command {
        Commands::Run(args) if !args.no_log_file => {
            args.log_file.clone().or_else(|| config.log_file.clone())
        }
        _ => None,
    };
    let _log_guard = logging::init(cli.verbose, cli.no_color, log_file.as_deref());

    // Create context for commands
    let ctx = commands::Context {
        config,
        config_path: cli.config,
        output_format,
        verbose: cli.verbose,
    };

    // Dispatch to appropriate command
    match command {
        Commands::Run(args) => commands::run::execute(ctx, args).await,
        Commands::Probe(args) => commands::probe::execute(ctx, args).await,
        Commands::Lookup(args) => commands::lookup::execute(ctx, args).await,
        Commands::Cache(args) => commands::cache::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args).await,
    }
}
