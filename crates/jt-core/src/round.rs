//! Rounding of per-issue totals up to the next quarter hour.
//!
//! Rounding appends a synthetic worklog rather than stretching an existing
//! one. Apply it once per parsed map, after parsing has finished.

use chrono::{Duration, Local, NaiveDate, TimeZone};

use crate::pattern::Pattern;
use crate::worklog::{Worklog, WorklogMap, total_duration};

/// Rounding granularity in minutes.
pub const ROUND_QUANTUM_MINUTES: i64 = 15;

/// Comment attached to padding worklogs.
pub const ROUND_COMMENT: &str = "round to 15 minutes";

/// Returns the time needed to bring the worklogs up to a multiple of 15
/// minutes.
pub fn round_up_remainder(worklogs: &[Worklog]) -> Duration {
    let quantum = ROUND_QUANTUM_MINUTES * 60;
    let remainder = total_duration(worklogs).num_seconds().rem_euclid(quantum);
    if remainder > 0 {
        Duration::seconds(quantum - remainder)
    } else {
        Duration::zero()
    }
}

/// Pads every issue matching a round pattern, dating padding entries today.
///
/// Returns the ids of the issues that received a padding worklog.
pub fn round_worklogs(worklogs: &mut WorklogMap, round: &[Pattern]) -> Vec<String> {
    round_worklogs_on(worklogs, round, Local::now().date_naive())
}

/// Pads every issue matching a round pattern, dating padding entries at
/// noon on `today`.
pub fn round_worklogs_on(
    worklogs: &mut WorklogMap,
    round: &[Pattern],
    today: NaiveDate,
) -> Vec<String> {
    let started = today
        .and_hms_opt(12, 0, 0)
        .and_then(|noon| Local.from_local_datetime(&noon).earliest());

    let padding: Vec<(String, Duration)> = worklogs
        .iter()
        .filter(|(issue, _)| round.iter().any(|p| p.is_match(issue)))
        .map(|(issue, entries)| (issue.clone(), round_up_remainder(entries)))
        .filter(|(_, pad)| *pad > Duration::zero())
        .collect();

    padding
        .into_iter()
        .map(|(issue, pad)| {
            tracing::debug!(issue = %issue, pad_minutes = pad.num_minutes(), "rounding issue total");
            worklogs.push(issue.clone(), Worklog::new(started, pad, ROUND_COMMENT));
            issue
        })
        .collect()
}
