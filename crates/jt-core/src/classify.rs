//! Line classification.
//!
//! Each trimmed, non-empty line maps to exactly one [`Event`]. Checks run in
//! a fixed priority order and the first match wins:
//!
//! 1. `HHMM-HHMM` time range
//! 2. explicit issue reference (`KEY-123` optionally followed by text)
//! 3. any configured ignore pattern
//! 4. anything else is a comment line

use std::sync::LazyLock;

use regex::Regex;

use crate::fsm::Event;
use crate::pattern::Rules;

/// Two 24-hour clock times separated by a hyphen.
pub(crate) static TIME_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{4}\s?$").unwrap());

/// An issue key at the start of a line, with optional trailing text.
pub(crate) static EXPLICIT_ISSUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+-[0-9]+)(\s.+)?$").unwrap());

/// Classifies a single trimmed line.
pub fn classify(line: &str, rules: &Rules) -> Event {
    if TIME_RANGE_RE.is_match(line) {
        Event::MatchDuration
    } else if EXPLICIT_ISSUE_RE.is_match(line) {
        Event::MatchExplicitIssue
    } else if rules.is_ignored(line) {
        Event::Ignore
    } else {
        Event::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn rules_ignoring(patterns: &[&str]) -> Rules {
        Rules {
            ignore: patterns.iter().map(|p| Pattern::new(p).unwrap()).collect(),
            ..Rules::default()
        }
    }

    #[test]
    fn time_ranges() {
        let rules = Rules::default();
        assert_eq!(classify("0900-0915", &rules), Event::MatchDuration);
        assert_eq!(classify("0900-0915 ", &rules), Event::MatchDuration);
        assert_eq!(classify("900-0915", &rules), Event::NoMatch);
        assert_eq!(classify("0900-0915  ", &rules), Event::NoMatch);
        assert_eq!(classify("0900 - 0915", &rules), Event::NoMatch);
    }

    #[test]
    fn explicit_issues() {
        let rules = Rules::default();
        assert_eq!(classify("ADMIN-1", &rules), Event::MatchExplicitIssue);
        assert_eq!(classify("abc-42 fix the build", &rules), Event::MatchExplicitIssue);
        assert_eq!(classify("ADMIN-", &rules), Event::NoMatch);
        assert_eq!(classify("ADMIN-1x", &rules), Event::NoMatch);
        assert_eq!(classify("A1-1", &rules), Event::NoMatch);
    }

    #[test]
    fn time_range_wins_over_everything() {
        let rules = rules_ignoring(&[".*"]);
        assert_eq!(classify("1200-1300", &rules), Event::MatchDuration);
    }

    #[test]
    fn explicit_issue_wins_over_ignore() {
        let rules = rules_ignoring(&["^ADMIN"]);
        assert_eq!(classify("ADMIN-1", &rules), Event::MatchExplicitIssue);
        assert_eq!(classify("ADMIN stuff", &rules), Event::Ignore);
    }

    #[test]
    fn any_ignore_pattern_suffices() {
        let rules = rules_ignoring(&["^lunch$", "^break"]);
        assert_eq!(classify("lunch", &rules), Event::Ignore);
        assert_eq!(classify("break time", &rules), Event::Ignore);
        assert_eq!(classify("lunch and learn", &rules), Event::NoMatch);
    }
}
