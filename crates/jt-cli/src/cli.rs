//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::dump::DumpArgs;
use crate::commands::parse::ParseArgs;
use crate::commands::submit::SubmitArgs;

/// Plain-text timesheets to Jira worklogs.
///
/// Reads a daily timesheet of `HHMM-HHMM` time ranges followed by issue
/// keys or lines matching configured rules, and logs the time in Jira.
#[derive(Debug, Parser)]
#[command(name = "jt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a timesheet and print the resulting worklogs.
    Parse(ParseArgs),

    /// Parse a timesheet and submit its worklogs to Jira.
    Submit(SubmitArgs),

    /// Print an author's existing Jira worklogs as JSON.
    DumpWorklogs(DumpArgs),
}
