//! Submit command: parse a timesheet and log its worklogs in Jira.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use jt_jira::{Client, UploadOptions, UploadReport};

use crate::Config;
use crate::commands::parse::{TimesheetArgs, load_worklogs};
use crate::report::write_summary;

#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub timesheet: TimesheetArgs,

    /// Shift every worklog by this many days (e.g. -1 for yesterday).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub day_offset: i64,

    /// Check issues in Jira but submit nothing.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &SubmitArgs, config: &Config) -> Result<UploadReport> {
    let worklogs = load_worklogs(&args.timesheet, &config.rules)?;
    write_summary(writer, &worklogs)?;
    if worklogs.is_empty() {
        return Ok(UploadReport::default());
    }

    let credentials = config.auth.credentials()?;
    let client =
        Client::new(config.jira_url()?, credentials).context("failed to create Jira client")?;
    let options = UploadOptions {
        day_offset: args.day_offset,
        dry_run: args.dry_run,
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let report = runtime
        .block_on(client.upload_worklogs(&worklogs, options))
        .context("failed to upload worklogs")?;

    if args.dry_run {
        writeln!(
            writer,
            "Dry run: {} issues checked, nothing submitted.",
            report.issues_checked
        )?;
    } else {
        writeln!(
            writer,
            "Submitted {} worklogs to {} issues.",
            report.worklogs_submitted, report.issues_checked
        )?;
    }
    Ok(report)
}
