//! End-to-end tests running the `jt` binary.
//!
//! Each test gets its own HOME so no user configuration leaks in.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG: &str = r#"
ignore = ["^lunch$"]
round = ["^INTERNAL-"]

[auth]
user = "me@example.com"
api_token = "token"

[[issues]]
id = "FOO-12"
patterns = ["^foo sync$"]
default_comment = "weekly sync"

[[issues]]
id = "INTERNAL-1"
patterns = ["^admin$"]
default_comment = "admin"
"#;

fn jt_binary() -> String {
    env!("CARGO_BIN_EXE_jt").to_string()
}

fn write_config(temp: &Path) -> PathBuf {
    let path = temp.join("config.toml");
    std::fs::write(&path, CONFIG).unwrap();
    path
}

fn jt(temp: &Path) -> Command {
    let mut command = Command::new(jt_binary());
    command
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env_remove("JT_JIRA_URL")
        .env_remove("RUST_LOG");
    command
}

fn run_with_stdin(mut command: Command, stdin: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run jt");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = jt(temp.path()).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "help output: {stdout}");
}

#[test]
fn test_parse_from_stdin() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let mut command = jt(temp.path());
    command.arg("--config").arg(&config).arg("parse");
    let output = run_with_stdin(command, "0900-0940\nfoo sync\n0940-0950\nadmin\n");

    assert!(
        output.status.success(),
        "jt parse should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "\
FOO-12 (40m)
      40m  weekly sync
INTERNAL-1 (15m)
      10m  admin
       5m  round to 15 minutes
Total: 55m in 3 worklogs across 2 issues
"
    );
}

#[test]
fn test_parse_json_without_rounding() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let mut command = jt(temp.path());
    command
        .arg("--config")
        .arg(&config)
        .arg("parse")
        .arg("--json")
        .arg("--no-round");
    let output = run_with_stdin(command, "0900-0915\nADMIN-1\n0915-0925\nadmin\n");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["ADMIN-1"][0]["duration_seconds"], 900);
    assert_eq!(value["ADMIN-1"][0]["comment"], "");
    assert_eq!(value["INTERNAL-1"].as_array().unwrap().len(), 1);
}

#[test]
fn test_parse_failure_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let mut command = jt(temp.path());
    command.arg("--config").arg(&config).arg("parse");
    let output = run_with_stdin(command, "0900-0915\nsomething unplanned\n");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse timesheet"), "stderr: {stderr}");
    assert!(
        stderr.contains("couldn't match issue to line: \"something unplanned\""),
        "stderr: {stderr}"
    );
}

#[test]
fn test_invalid_config_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "ignore = [\"(unclosed\"]\n").unwrap();

    let output = jt(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("parse")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "stderr: {stderr}");
}

#[test]
fn test_submit_requires_jira_url() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let mut command = jt(temp.path());
    command.arg("--config").arg(&config).arg("submit");
    let output = run_with_stdin(command, "0900-0915\nADMIN-1\n");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing Jira URL"), "stderr: {stderr}");
}

#[test]
fn test_submit_uploads_to_jira() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/ADMIN-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "1", "key": "ADMIN-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue/ADMIN-1/worklog"))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&server)
            .await;
        server
    });

    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let mut command = jt(temp.path());
    command
        .env("JT_JIRA_URL", server.uri())
        .arg("--config")
        .arg(&config)
        .arg("submit")
        .arg("--day-offset")
        .arg("-1");
    let output = run_with_stdin(command, "0900-0915\nADMIN-1 inbox\n0915-0945\nADMIN-1 review\n");

    assert!(
        output.status.success(),
        "jt submit should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with("Submitted 2 worklogs to 1 issues.\n"), "stdout: {stdout}");

    runtime.block_on(server.verify());
}

#[test]
fn test_submit_dry_run_checks_issues_only() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/FOO-12"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "12", "key": "FOO-12"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        server
    });

    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let mut command = jt(temp.path());
    command
        .env("JT_JIRA_URL", server.uri())
        .arg("--config")
        .arg(&config)
        .arg("submit")
        .arg("--dry-run");
    let output = run_with_stdin(command, "1000-1030\nfoo sync\n");

    assert!(
        output.status.success(),
        "jt submit --dry-run should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(
        stdout.ends_with("Dry run: 1 issues checked, nothing submitted.\n"),
        "stdout: {stdout}"
    );

    runtime.block_on(server.verify());
}
