//! Parsed worklog entries grouped by issue.

use std::collections::BTreeMap;
use std::collections::btree_map;

use chrono::{DateTime, Duration, Local};
use serde::{Serialize, Serializer};

/// A single quantum of logged time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worklog {
    /// When the work started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Local>>,

    /// How long the work took. Always positive.
    #[serde(rename = "duration_seconds", serialize_with = "serialize_seconds")]
    pub duration: Duration,

    /// Free-text comment, possibly multi-line, possibly empty.
    pub comment: String,
}

impl Worklog {
    /// Creates a worklog. `duration` must be positive.
    pub fn new(
        started: Option<DateTime<Local>>,
        duration: Duration,
        comment: impl Into<String>,
    ) -> Self {
        debug_assert!(duration > Duration::zero(), "worklog duration must be positive");
        Self {
            started,
            duration,
            comment: comment.into(),
        }
    }
}

fn serialize_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(duration.num_seconds())
}

/// Worklogs keyed by issue id.
///
/// Entries for an issue keep the order in which they were discovered; issue
/// ids iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorklogMap(BTreeMap<String, Vec<Worklog>>);

impl WorklogMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a worklog to the issue's list, creating it if needed.
    pub fn push(&mut self, issue: impl Into<String>, worklog: Worklog) {
        self.0.entry(issue.into()).or_default().push(worklog);
    }

    pub fn get(&self, issue: &str) -> Option<&[Worklog]> {
        self.0.get(issue).map(Vec::as_slice)
    }

    pub fn issues(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<Worklog>> {
        self.0.iter()
    }

    /// Number of distinct issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of worklogs across all issues.
    pub fn entry_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Total logged time for one issue (zero if absent).
    pub fn total_for(&self, issue: &str) -> Duration {
        self.get(issue).map_or_else(Duration::zero, total_duration)
    }

    /// Total logged time across all issues.
    pub fn total(&self) -> Duration {
        self.0
            .values()
            .fold(Duration::zero(), |acc, worklogs| acc + total_duration(worklogs))
    }
}

/// Sums the durations of a slice of worklogs.
pub fn total_duration(worklogs: &[Worklog]) -> Duration {
    worklogs
        .iter()
        .fold(Duration::zero(), |acc, worklog| acc + worklog.duration)
}

impl<'a> IntoIterator for &'a WorklogMap {
    type Item = (&'a String, &'a Vec<Worklog>);
    type IntoIter = btree_map::Iter<'a, String, Vec<Worklog>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for WorklogMap {
    type Item = (String, Vec<Worklog>);
    type IntoIter = btree_map::IntoIter<String, Vec<Worklog>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<WorklogMap> for BTreeMap<String, Vec<Worklog>> {
    fn from(map: WorklogMap) -> Self {
        map.0
    }
}
