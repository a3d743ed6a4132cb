//! Reading existing worklogs back out of Jira.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{Client, JiraError};

/// Page size for issue searches (Jira's maximum).
const SEARCH_PAGE_SIZE: usize = 1000;
/// Page size for worklog listings (Jira's maximum).
const WORKLOG_PAGE_SIZE: usize = 5000;

/// The identifying fields of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// A worklog as stored in Jira.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub started: String,
    pub time_spent_seconds: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    start_at: usize,
    total: usize,
    #[serde(default)]
    issues: Vec<IssueRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorklogPage {
    start_at: usize,
    total: usize,
    #[serde(default)]
    worklogs: Vec<WorklogRecord>,
}

fn by_author(record: &WorklogRecord, author: &str) -> bool {
    record
        .author
        .as_ref()
        .is_some_and(|a| a.display_name == author)
}

impl Client {
    /// Returns every issue matching the JQL query, following pagination.
    pub async fn search_issues(&self, jql: &str) -> Result<Vec<IssueRef>, JiraError> {
        let mut issues = Vec::new();
        let mut start_at = 0;
        loop {
            let page: SearchPage = self
                .get_json(
                    "/rest/api/2/search",
                    &[
                        ("jql", jql.to_string()),
                        ("startAt", start_at.to_string()),
                        ("maxResults", SEARCH_PAGE_SIZE.to_string()),
                        ("fields", "id,key".to_string()),
                    ],
                )
                .await?;
            let fetched = page.issues.len();
            issues.extend(page.issues);
            start_at = page.start_at + fetched;
            if fetched == 0 || start_at >= page.total {
                return Ok(issues);
            }
        }
    }

    /// Returns the author's worklogs on an issue started on or after `since`.
    pub async fn issue_worklogs(
        &self,
        key: &str,
        since: NaiveDate,
        author: &str,
    ) -> Result<Vec<WorklogRecord>, JiraError> {
        let path = format!("/rest/api/2/issue/{key}/worklog");
        let started_after = start_of_day_millis(since);
        let mut records = Vec::new();
        let mut start_at = 0;
        loop {
            let page: WorklogPage = self
                .get_json(
                    &path,
                    &[
                        ("startAt", start_at.to_string()),
                        ("maxResults", WORKLOG_PAGE_SIZE.to_string()),
                        ("startedAfter", started_after.to_string()),
                    ],
                )
                .await?;
            let fetched = page.worklogs.len();
            records.extend(page.worklogs.into_iter().filter(|r| by_author(r, author)));
            start_at = page.start_at + fetched;
            if fetched == 0 || start_at >= page.total {
                return Ok(records);
            }
        }
    }

    /// Returns all of the author's worklogs since `since`, keyed by issue.
    pub async fn dump_worklogs(
        &self,
        since: NaiveDate,
        author: &str,
    ) -> Result<BTreeMap<String, Vec<WorklogRecord>>, JiraError> {
        let jql = format!(
            r#"worklogAuthor = "{author}" AND worklogDate >= "{}""#,
            since.format("%Y-%m-%d")
        );
        let issues = self.search_issues(&jql).await?;
        tracing::info!(issue_count = issues.len(), "found issues");

        let mut worklogs = BTreeMap::new();
        for issue in issues {
            let records = self.issue_worklogs(&issue.key, since, author).await?;
            tracing::info!(
                issue = %issue.key,
                worklog_record_count = records.len(),
                "found worklog records"
            );
            worklogs.insert(issue.key, records);
        }
        Ok(worklogs)
    }
}

fn start_of_day_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .map_or(0, |start| start.timestamp_millis())
}
