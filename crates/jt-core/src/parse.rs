//! Line-by-line driver for the timesheet state machine.

use std::io::BufRead;

use chrono::{Local, NaiveDate};

use crate::classify::classify;
use crate::error::ParseError;
use crate::fsm::{Event, State, transition};
use crate::pattern::Rules;
use crate::worklog::WorklogMap;

/// Incremental timesheet parser.
///
/// Feed lines in order with [`Parser::feed_line`], then call
/// [`Parser::finish`]. After an error the parser must be discarded.
#[derive(Debug)]
pub struct Parser<'r> {
    rules: &'r Rules,
    today: NaiveDate,
    state: State,
    worklogs: WorklogMap,
}

impl<'r> Parser<'r> {
    /// Creates a parser anchoring time ranges to today's local date.
    pub fn new(rules: &'r Rules) -> Self {
        Self::on(rules, Local::now().date_naive())
    }

    /// Creates a parser anchoring time ranges to the given date.
    pub fn on(rules: &'r Rules, today: NaiveDate) -> Self {
        Self {
            rules,
            today,
            state: State::Start,
            worklogs: WorklogMap::new(),
        }
    }

    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Classifies and applies one raw input line. Blank lines are skipped.
    pub fn feed_line(&mut self, line: &str) -> Result<(), ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let event = classify(line, self.rules);
        self.occur(event, line)
    }

    /// Applies an already-classified event.
    pub fn occur(&mut self, event: Event, line: &str) -> Result<(), ParseError> {
        let state = std::mem::take(&mut self.state);
        let step = transition(state, event, line, self.rules, self.today)?;
        if let Some((issue, worklog)) = step.flushed {
            tracing::debug!(
                issue = %issue,
                duration_minutes = worklog.duration.num_minutes(),
                "worklog flushed"
            );
            self.worklogs.push(issue, worklog);
        }
        self.state = step.state;
        Ok(())
    }

    /// Signals end of input and returns the collected worklogs.
    pub fn finish(mut self) -> Result<WorklogMap, ParseError> {
        self.occur(Event::EndOfInput, "")?;
        Ok(self.worklogs)
    }
}

/// Parses a whole timesheet, anchoring time ranges to today's local date.
pub fn parse_timesheet<R: BufRead>(reader: R, rules: &Rules) -> Result<WorklogMap, ParseError> {
    parse_timesheet_on(reader, rules, Local::now().date_naive())
}

/// Parses a whole timesheet, anchoring time ranges to `today`.
pub fn parse_timesheet_on<R: BufRead>(
    reader: R,
    rules: &Rules,
    today: NaiveDate,
) -> Result<WorklogMap, ParseError> {
    let mut parser = Parser::on(rules, today);
    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.map_err(|source| ParseError::Read {
            line_number,
            source,
        })?;
        tracing::trace!(line_number, line = %line, "timesheet line");
        parser.feed_line(&line).inspect_err(|err| {
            tracing::debug!(line_number, error = %err, "timesheet parse failed");
        })?;
    }
    let worklogs = parser.finish()?;
    tracing::debug!(
        issues = worklogs.len(),
        entries = worklogs.entry_count(),
        "timesheet parsed"
    );
    Ok(worklogs)
}
