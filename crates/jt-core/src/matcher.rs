//! Issue resolution for the first line of a time block.

use crate::classify::EXPLICIT_ISSUE_RE;
use crate::error::ParseError;
use crate::pattern::Rules;

/// An issue named literally on the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitIssue<'l> {
    pub id: &'l str,
    /// Trailing text after the key, trimmed of spaces and hyphens.
    pub comment: Option<&'l str>,
}

/// An issue inferred from the configured rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitIssue<'r, 'l> {
    pub id: &'r str,
    pub default_comment: Option<&'r str>,
    /// Non-empty text captured by the matching pattern's first group.
    pub comment: Option<&'l str>,
}

/// Trims the spaces and hyphens people use to decorate comment lines.
pub fn trim_comment(line: &str) -> &str {
    line.trim_matches(|c| c == ' ' || c == '-')
}

/// Extracts the issue key and trailing text from an explicit issue line.
pub fn resolve_explicit(line: &str) -> Result<ExplicitIssue<'_>, ParseError> {
    let caps = EXPLICIT_ISSUE_RE
        .captures(line)
        .ok_or_else(|| ParseError::NotExplicitIssue {
            line: line.to_string(),
        })?;
    let id = caps
        .get(1)
        .ok_or_else(|| ParseError::NotExplicitIssue {
            line: line.to_string(),
        })?
        .as_str();
    let comment = caps.get(2).map(|m| trim_comment(m.as_str()));
    Ok(ExplicitIssue { id, comment })
}

/// Finds the first rule with a pattern matching the line.
///
/// Rules are tried in declared order, and patterns within a rule in declared
/// order.
pub fn resolve_implicit<'r, 'l>(
    line: &'l str,
    rules: &'r Rules,
) -> Result<ImplicitIssue<'r, 'l>, ParseError> {
    for rule in &rules.issues {
        for pattern in &rule.patterns {
            let Some(caps) = pattern.captures(line) else {
                continue;
            };
            let comment = caps
                .get(1)
                .map(|m| trim_comment(m.as_str()))
                .filter(|c| !c.is_empty());
            tracing::trace!(issue = %rule.id, pattern = %pattern, "implicit issue matched");
            return Ok(ImplicitIssue {
                id: &rule.id,
                default_comment: rule.default_comment.as_deref(),
                comment,
            });
        }
    }
    Err(ParseError::UnmatchedIssue {
        line: line.to_string(),
    })
}
