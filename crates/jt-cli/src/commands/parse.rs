//! Parse command: turn a timesheet into worklogs without touching Jira.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;

use jt_core::{Rules, WorklogMap, parse_timesheet_on, round_worklogs_on};

use crate::Config;
use crate::report::write_summary;

/// Where to read the timesheet from and how to post-process it.
#[derive(Debug, Args)]
pub struct TimesheetArgs {
    /// Timesheet file to read. Reads stdin when omitted.
    pub file: Option<PathBuf>,

    /// Do not round issue totals up to 15 minutes.
    #[arg(long)]
    pub no_round: bool,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    #[command(flatten)]
    pub timesheet: TimesheetArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ParseArgs, config: &Config) -> Result<()> {
    let worklogs = load_worklogs(&args.timesheet, &config.rules)?;
    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&worklogs)?)?;
    } else {
        write_summary(writer, &worklogs)?;
    }
    Ok(())
}

/// Reads, parses and (unless disabled) rounds the timesheet.
pub fn load_worklogs(args: &TimesheetArgs, rules: &Rules) -> Result<WorklogMap> {
    let today = Local::now().date_naive();
    match &args.file {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            build_worklogs(BufReader::new(file), rules, !args.no_round, today)
        }
        None => build_worklogs(io::stdin().lock(), rules, !args.no_round, today),
    }
}

fn build_worklogs<R: BufRead>(
    reader: R,
    rules: &Rules,
    round: bool,
    today: NaiveDate,
) -> Result<WorklogMap> {
    let mut worklogs =
        parse_timesheet_on(reader, rules, today).context("failed to parse timesheet")?;
    if round {
        let rounded = round_worklogs_on(&mut worklogs, &rules.round, today);
        if !rounded.is_empty() {
            tracing::info!(issues = ?rounded, "rounded issue totals to 15 minutes");
        }
    }
    Ok(worklogs)
}
