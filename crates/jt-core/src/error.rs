//! Errors that abort a timesheet parse.

use thiserror::Error;

use crate::fsm::Event;

/// A fatal timesheet parse error.
///
/// Any of these abandons the whole parse; no partial result is returned.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The time range did not split into a start and an end.
    #[error("bad time range format: {line:?}")]
    TimeRangeFormat { line: String },

    /// One half of the time range is not a valid `HHMM` clock time.
    #[error("couldn't parse {which} time in {line:?}")]
    ClockTime {
        line: String,
        which: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    /// The end of the time range is not after its start.
    #[error("invalid duration in {line:?}: end must be after start")]
    NonPositiveDuration { line: String },

    /// The start time falls in a local time-zone gap.
    #[error("start time in {line:?} does not exist in the local time zone")]
    LocalTime { line: String },

    /// No configured issue rule matched the first line of a block.
    #[error("couldn't match issue to line: {line:?}")]
    UnmatchedIssue { line: String },

    /// A time range followed another time range before any issue line.
    #[error("time range {line:?} follows a time block with no issue")]
    MissingIssue { line: String },

    /// A line classified as an explicit issue no longer matched on resolution.
    #[error("line {line:?} is not an explicit issue reference")]
    NotExplicitIssue { line: String },

    /// The event has no transition from the current state.
    #[error("unexpected {event} in state {state} at line {line:?}")]
    UnexpectedEvent {
        state: &'static str,
        event: Event,
        line: String,
    },

    /// The underlying reader failed.
    #[error("failed to read line {line_number}")]
    Read {
        line_number: usize,
        #[source]
        source: std::io::Error,
    },
}
