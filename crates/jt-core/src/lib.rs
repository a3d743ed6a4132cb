//! Core timesheet logic for jt.
//!
//! This crate turns a plain-text daily timesheet into worklogs grouped by
//! issue:
//! - Classification: deciding what each line is
//! - Matching: resolving explicit and configured (implicit) issues
//! - The state machine that groups lines into time blocks
//! - Rounding of per-issue totals to 15 minutes
//!
//! It performs no network or file I/O of its own.

pub mod classify;
mod error;
pub mod fsm;
pub mod matcher;
pub mod parse;
pub mod pattern;
pub mod round;
pub mod worklog;

pub use error::ParseError;
pub use fsm::{Event, State};
pub use parse::{Parser, parse_timesheet, parse_timesheet_on};
pub use pattern::{IssueRule, Pattern, RuleError, Rules};
pub use round::{ROUND_COMMENT, round_worklogs, round_worklogs_on};
pub use worklog::{Worklog, WorklogMap};
