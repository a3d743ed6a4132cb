//! The timesheet state machine.
//!
//! Each state carries exactly the pending data valid in it, and
//! [`transition`] is a pure function of the current state, the event, the
//! line that produced it and the rules. Re-entering an issue state from
//! itself appends a comment line; it never re-resolves the issue.
//!
//! | Source | Event | Destination |
//! |---|---|---|
//! | `Start` | `MatchDuration` | `GotDuration` |
//! | `Start` | `EndOfInput` | `End` |
//! | `GotDuration` | `MatchExplicitIssue` | `GotExplicitIssue` |
//! | `GotDuration` | `NoMatch` | `GotImplicitIssue` |
//! | `GotDuration` | `Ignore` | `Start` (block dropped) |
//! | `GotDuration` | `MatchDuration` | error (block has no issue) |
//! | `GotExplicitIssue` | `NoMatch`, `Ignore` | `GotExplicitIssue` |
//! | `GotExplicitIssue` | `MatchDuration` | `GotDuration` (flush) |
//! | `GotExplicitIssue` | `EndOfInput` | `End` (flush) |
//! | `GotImplicitIssue` | `NoMatch`, `Ignore` | `GotImplicitIssue` |
//! | `GotImplicitIssue` | `MatchDuration` | `GotDuration` (flush) |
//! | `GotImplicitIssue` | `EndOfInput` | `End` (flush) |
//!
//! Every other pair is a structural error.

use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};

use crate::error::ParseError;
use crate::matcher::{resolve_explicit, resolve_implicit, trim_comment};
use crate::pattern::Rules;
use crate::worklog::Worklog;

/// Input alphabet of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    MatchDuration,
    MatchExplicitIssue,
    NoMatch,
    Ignore,
    EndOfInput,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MatchDuration => "time range",
            Self::MatchExplicitIssue => "explicit issue",
            Self::NoMatch => "comment line",
            Self::Ignore => "ignored line",
            Self::EndOfInput => "end of input",
        };
        write!(f, "{s}")
    }
}

/// Start and length of a time block, from its `HHMM-HHMM` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub started: DateTime<Local>,
    pub duration: Duration,
}

/// A time block whose issue is known, waiting to be flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub span: Span,
    pub issue: String,
    pub comment: Vec<String>,
    pub default_comment: Option<String>,
}

impl Pending {
    /// Finalizes the block into an issue id and worklog.
    ///
    /// The default comment is used only when no comment line was collected.
    pub fn flush(self) -> (String, Worklog) {
        let mut comment = self.comment;
        if comment.is_empty() {
            comment.extend(self.default_comment.filter(|c| !c.is_empty()));
        }
        let worklog = Worklog::new(
            Some(self.span.started),
            self.span.duration,
            comment.join("\n"),
        );
        (self.issue, worklog)
    }
}

/// Parser state, carrying the data pending in each state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Start,
    GotDuration(Span),
    GotExplicitIssue(Pending),
    GotImplicitIssue(Pending),
    End,
}

impl State {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::GotDuration(_) => "got-duration",
            Self::GotExplicitIssue(_) => "got-explicit-issue",
            Self::GotImplicitIssue(_) => "got-implicit-issue",
            Self::End => "end",
        }
    }
}

/// Result of a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub state: State,
    /// Worklog completed by this transition, if any.
    pub flushed: Option<(String, Worklog)>,
}

impl Step {
    const fn to(state: State) -> Self {
        Self {
            state,
            flushed: None,
        }
    }

    const fn flushing(state: State, flushed: (String, Worklog)) -> Self {
        Self {
            state,
            flushed: Some(flushed),
        }
    }
}

/// Applies one event to the machine.
///
/// `today` is the date time ranges are anchored to.
pub fn transition(
    state: State,
    event: Event,
    line: &str,
    rules: &Rules,
    today: NaiveDate,
) -> Result<Step, ParseError> {
    match (state, event) {
        (State::Start, Event::MatchDuration) => {
            Ok(Step::to(State::GotDuration(parse_time_range(line, today)?)))
        }
        (State::Start, Event::EndOfInput) => Ok(Step::to(State::End)),

        (State::GotDuration(span), Event::MatchExplicitIssue) => {
            let explicit = resolve_explicit(line)?;
            let comment = explicit.comment.map(str::to_string).into_iter().collect();
            Ok(Step::to(State::GotExplicitIssue(Pending {
                span,
                issue: explicit.id.to_string(),
                comment,
                default_comment: None,
            })))
        }
        (State::GotDuration(span), Event::NoMatch) => {
            let implicit = resolve_implicit(line, rules)?;
            let comment = implicit.comment.map(str::to_string).into_iter().collect();
            Ok(Step::to(State::GotImplicitIssue(Pending {
                span,
                issue: implicit.id.to_string(),
                comment,
                default_comment: implicit.default_comment.map(str::to_string),
            })))
        }
        (State::GotDuration(span), Event::Ignore) => {
            tracing::debug!(?span, line, "dropping time block with ignored first line");
            Ok(Step::to(State::Start))
        }
        (State::GotDuration(_), Event::MatchDuration) => Err(ParseError::MissingIssue {
            line: line.to_string(),
        }),

        (State::GotExplicitIssue(mut pending), Event::NoMatch | Event::Ignore) => {
            pending.comment.push(trim_comment(line).to_string());
            Ok(Step::to(State::GotExplicitIssue(pending)))
        }
        (State::GotImplicitIssue(mut pending), Event::NoMatch | Event::Ignore) => {
            pending.comment.push(trim_comment(line).to_string());
            Ok(Step::to(State::GotImplicitIssue(pending)))
        }

        (
            State::GotExplicitIssue(pending) | State::GotImplicitIssue(pending),
            Event::MatchDuration,
        ) => {
            let flushed = pending.flush();
            let span = parse_time_range(line, today)?;
            Ok(Step::flushing(State::GotDuration(span), flushed))
        }
        (
            State::GotExplicitIssue(pending) | State::GotImplicitIssue(pending),
            Event::EndOfInput,
        ) => Ok(Step::flushing(State::End, pending.flush())),

        (state, event) => Err(ParseError::UnexpectedEvent {
            state: state.name(),
            event,
            line: line.to_string(),
        }),
    }
}

/// Parses `HHMM-HHMM` into a start time on `today` and a duration.
pub fn parse_time_range(line: &str, today: NaiveDate) -> Result<Span, ParseError> {
    let parts: Vec<&str> = line.trim().split('-').collect();
    let [start, end] = parts.as_slice() else {
        return Err(ParseError::TimeRangeFormat {
            line: line.to_string(),
        });
    };

    let start = parse_clock(start, line, "start")?;
    let end = parse_clock(end, line, "end")?;

    let duration = end - start;
    if duration <= Duration::zero() {
        return Err(ParseError::NonPositiveDuration {
            line: line.to_string(),
        });
    }

    let started = Local
        .from_local_datetime(&today.and_time(start))
        .earliest()
        .ok_or_else(|| ParseError::LocalTime {
            line: line.to_string(),
        })?;

    Ok(Span { started, duration })
}

fn parse_clock(value: &str, line: &str, which: &'static str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(value, "%H%M").map_err(|source| ParseError::ClockTime {
        line: line.to_string(),
        which,
        source,
    })
}
