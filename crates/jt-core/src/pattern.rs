//! Issue rules and the regular expressions they are built from.

use std::fmt;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or validating rules.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A configured pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An issue rule was configured without an issue id.
    #[error("issue rule #{index} has an empty id")]
    EmptyIssueId { index: usize },
}

/// A compiled regular expression that serializes as its source text.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles a pattern.
    pub fn new(source: &str) -> Result<Self, RuleError> {
        Regex::new(source)
            .map(Self)
            .map_err(|source_err| RuleError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            })
    }

    /// Returns the source text of the pattern.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }

    pub fn captures<'h>(&self, haystack: &'h str) -> Option<Captures<'h>> {
        self.0.captures(haystack)
    }
}

impl TryFrom<String> for Pattern {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A known issue and the lines that implicitly refer to it.
///
/// Patterns are tried in the order they are declared. When the matching
/// pattern has a capture group, the captured text becomes the start of the
/// worklog comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRule {
    /// Issue key, e.g. `FOO-12`.
    pub id: String,

    #[serde(default, alias = "regexes")]
    pub patterns: Vec<Pattern>,

    /// Comment used when a block has no comment lines of its own.
    #[serde(
        default,
        alias = "defaultComment",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_comment: Option<String>,
}

impl IssueRule {
    /// Builds a rule from pattern sources.
    pub fn new<I, S>(id: impl Into<String>, patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: id.into(),
            patterns,
            default_comment: None,
        })
    }

    #[must_use]
    pub fn with_default_comment(mut self, comment: impl Into<String>) -> Self {
        self.default_comment = Some(comment.into());
        self
    }
}

/// Everything the parser and rounder need from configuration.
///
/// Order within each list is significant: the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub issues: Vec<IssueRule>,

    /// Lines that carry no information of their own.
    #[serde(default)]
    pub ignore: Vec<Pattern>,

    /// Issue ids whose total logged time is padded to 15 minutes.
    #[serde(default)]
    pub round: Vec<Pattern>,
}

impl Rules {
    /// Returns true if any ignore pattern matches the line.
    pub fn is_ignored(&self, line: &str) -> bool {
        self.ignore.iter().any(|p| p.is_match(line))
    }

    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), RuleError> {
        match self.issues.iter().position(|rule| rule.id.trim().is_empty()) {
            Some(index) => Err(RuleError::EmptyIssueId { index }),
            None => Ok(()),
        }
    }
}
