//! Issue checks and worklog submission.

use chrono::{Duration, Local};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use jt_core::{Worklog, WorklogMap};

use crate::dump::IssueRef;
use crate::{Client, JiraError};

/// Timestamp format Jira expects for `started`.
const JIRA_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Upload behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Days added to every start time (e.g. -1 logs the timesheet as yesterday).
    pub day_offset: i64,
    /// Check the issues but submit nothing.
    pub dry_run: bool,
}

/// What an upload did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub issues_checked: usize,
    pub worklogs_submitted: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorklogPayload<'a> {
    comment: &'a str,
    started: String,
    time_spent_seconds: i64,
}

impl<'a> WorklogPayload<'a> {
    fn new(worklog: &'a Worklog, day_offset: i64) -> Self {
        let started = worklog.started.unwrap_or_else(Local::now) + Duration::days(day_offset);
        Self {
            comment: &worklog.comment,
            started: started.format(JIRA_TIME_FORMAT).to_string(),
            time_spent_seconds: worklog.duration.num_seconds(),
        }
    }
}

/// Jira Cloud intermittently answers 401 for valid tokens.
fn retry_issue_check(err: &JiraError) -> bool {
    err.status() == Some(StatusCode::UNAUTHORIZED)
}

/// Freshly created or moved issues can briefly 404 on the worklog endpoint.
fn retry_add_worklog(err: &JiraError) -> bool {
    match err.status() {
        Some(status) => status == StatusCode::NOT_FOUND || status.is_server_error(),
        None => false,
    }
}

impl Client {
    /// Fetches an issue's id and key.
    pub async fn issue(&self, key: &str) -> Result<IssueRef, JiraError> {
        let path = format!("/rest/api/2/issue/{key}");
        match self.get_json(&path, &[("fields", "key".to_string())]).await {
            Err(JiraError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(JiraError::IssueNotFound {
                    key: key.to_string(),
                })
            }
            other => other,
        }
    }

    /// Adds one worklog to an issue, shifting its start by `day_offset` days.
    pub async fn add_worklog(
        &self,
        key: &str,
        worklog: &Worklog,
        day_offset: i64,
    ) -> Result<(), JiraError> {
        let path = format!("/rest/api/2/issue/{key}/worklog");
        let payload = WorklogPayload::new(worklog, day_offset);
        let request = self.request(Method::POST, &path).json(&payload);
        self.send(&path, request).await?;
        Ok(())
    }

    /// Uploads every worklog in the map.
    ///
    /// All issues are checked before the first worklog is written, so a typo
    /// in an issue key leaves Jira untouched.
    pub async fn upload_worklogs(
        &self,
        worklogs: &WorklogMap,
        options: UploadOptions,
    ) -> Result<UploadReport, JiraError> {
        let mut report = UploadReport::default();

        for key in worklogs.issues() {
            let operation = format!("checking issue {key}");
            self.with_retries(&operation, retry_issue_check, || self.issue(key))
                .await?;
            report.issues_checked += 1;
        }

        if options.dry_run {
            tracing::info!(issues = report.issues_checked, "dry run: not submitting worklogs");
            return Ok(report);
        }

        for (key, entries) in worklogs {
            for worklog in entries {
                let operation = format!("adding worklog to {key}");
                self.with_retries(&operation, retry_add_worklog, || {
                    self.add_worklog(key, worklog, options.day_offset)
                })
                .await?;
                report.worklogs_submitted += 1;
            }
            tracing::info!(issue = %key, worklogs = entries.len(), "worklogs submitted");
        }

        Ok(report)
    }
}
