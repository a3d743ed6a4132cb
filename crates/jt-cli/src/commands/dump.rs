//! Dump command: print existing Jira worklogs as JSON.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Args;

use jt_jira::Client;

use super::util::parse_timeout;
use crate::Config;

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Earliest worklog date to include (YYYY-MM-DD).
    #[arg(long)]
    pub since: NaiveDate,

    /// Worklog author display name.
    #[arg(long)]
    pub author: String,

    /// Maximum time the whole dump may take (e.g. 30s, 15m, 1h).
    #[arg(long, default_value = "1h", value_parser = parse_timeout)]
    pub timeout: Duration,
}

pub fn run<W: Write>(writer: &mut W, args: &DumpArgs, config: &Config) -> Result<()> {
    let credentials = config.auth.credentials()?;
    let client =
        Client::new(config.jira_url()?, credentials).context("failed to create Jira client")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let worklogs = runtime.block_on(with_deadline(
        args.timeout,
        client.dump_worklogs(args.since, &args.author),
    ))?;

    writeln!(writer, "{}", serde_json::to_string(&worklogs)?)?;
    Ok(())
}

/// Runs `operation` until it finishes, `timeout` elapses or Ctrl-C arrives.
async fn with_deadline<T, E, F>(timeout: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    tokio::select! {
        result = tokio::time::timeout(timeout, operation) => match result {
            Ok(result) => result.context("failed to dump worklogs"),
            Err(_) => bail!("dump timed out after {}s", timeout.as_secs()),
        },
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            bail!("dump interrupted")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    use clap::Parser;

    use crate::{Cli, Commands};

    #[tokio::test]
    async fn test_with_deadline_returns_result() {
        let value = with_deadline(Duration::from_secs(5), async { Ok::<_, io::Error>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let err = with_deadline(
            Duration::from_millis(10),
            std::future::pending::<Result<(), io::Error>>(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
    }

    #[tokio::test]
    async fn test_with_deadline_wraps_operation_error() {
        let err = with_deadline(Duration::from_secs(5), async {
            Err::<(), _>(io::Error::other("boom"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "failed to dump worklogs");
    }

    #[test]
    fn test_timeout_defaults_to_one_hour() {
        let cli = Cli::try_parse_from([
            "jt",
            "dump-worklogs",
            "--since",
            "2024-03-01",
            "--author",
            "Jane Doe",
        ])
        .unwrap();
        let Some(Commands::DumpWorklogs(args)) = cli.command else {
            panic!("expected dump-worklogs");
        };
        assert_eq!(args.timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_timeout_flag_is_parsed() {
        let cli = Cli::try_parse_from([
            "jt",
            "dump-worklogs",
            "--since",
            "2024-03-01",
            "--author",
            "Jane Doe",
            "--timeout",
            "90s",
        ])
        .unwrap();
        let Some(Commands::DumpWorklogs(args)) = cli.command else {
            panic!("expected dump-worklogs");
        };
        assert_eq!(args.timeout, Duration::from_secs(90));
        let bad = Cli::try_parse_from([
            "jt",
            "dump-worklogs",
            "--since",
            "2024-03-01",
            "--author",
            "Jane Doe",
            "--timeout",
            "soon",
        ]);
        assert!(bad.is_err());
    }
}
