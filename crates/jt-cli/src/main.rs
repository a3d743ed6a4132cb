use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jt_cli::commands::{dump, parse, submit};
use jt_cli::{Cli, Commands, Config};

/// Load config and check the rules it carries.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    config.rules.validate().context("invalid issue rules")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();
    match &cli.command {
        Some(Commands::Parse(args)) => {
            let config = load_config(cli.config.as_deref())?;
            parse::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Submit(args)) => {
            let config = load_config(cli.config.as_deref())?;
            let report = submit::run(&mut stdout, args, &config)?;
            tracing::debug!(?report, "submit finished");
        }
        Some(Commands::DumpWorklogs(args)) => {
            let config = load_config(cli.config.as_deref())?;
            dump::run(&mut stdout, args, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
