//! Human-readable worklog summaries.

use std::io::{self, Write};

use chrono::Duration;

use jt_core::WorklogMap;
use jt_core::worklog::total_duration;

/// Formats a duration as `1h 5m`, `2h` or `40m`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_minutes();
    match (total / 60, total % 60) {
        (0, minutes) => format!("{minutes}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h {minutes}m"),
    }
}

/// Writes one block per issue with its total, then one line per worklog.
pub fn write_summary<W: Write>(writer: &mut W, worklogs: &WorklogMap) -> io::Result<()> {
    if worklogs.is_empty() {
        writeln!(writer, "No worklogs.")?;
        return Ok(());
    }

    for (issue, entries) in worklogs {
        writeln!(writer, "{issue} ({})", format_duration(total_duration(entries)))?;
        for entry in entries {
            let comment = if entry.comment.is_empty() {
                "-".to_string()
            } else {
                entry.comment.replace('\n', " / ")
            };
            writeln!(writer, "  {:>7}  {comment}", format_duration(entry.duration))?;
        }
    }

    writeln!(
        writer,
        "Total: {} in {} worklogs across {} issues",
        format_duration(worklogs.total()),
        worklogs.entry_count(),
        worklogs.len()
    )
}
