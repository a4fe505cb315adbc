//! CLI integration tests for taskplan
//!
//! These tests run the binary against request files and check both the
//! rendered plans and the way failures are reported.

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get a command instance for the taskplan binary
fn taskplan_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("taskplan"));
    cmd.env_remove("TASKPLAN_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// A scratch directory holding an explicit default config
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        Self::with_config("")
    }

    fn with_config(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("taskplan.toml");
        fs::write(&config, content).unwrap();
        Self { dir, config }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = taskplan_cmd();
        cmd.current_dir(self.dir.path()).arg("--config").arg(&self.config);
        cmd
    }
}

const DESIGN_BUILD_TEST: &str = r#"{
    "now": "2025-01-06T09:00:00Z",
    "tasks": [
        {"title": "Design", "estimatedHours": 2, "dependencies": []},
        {"title": "Build", "estimatedHours": 4, "dependencies": ["Design"]},
        {"title": "Test", "estimatedHours": 1, "dueDate": "2025-01-09T09:00:00Z", "dependencies": ["Build"]}
    ]
}"#;

// =============================================================================
// Plan
// =============================================================================

#[test]
fn test_plan_json_output() {
    let ws = Workspace::new();
    let input = ws.write("request.json", DESIGN_BUILD_TEST);

    let output = ws
        .cmd()
        .args(["--format", "json", "plan"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["recommendedOrder"],
        serde_json::json!(["Design", "Build", "Test"])
    );
    assert_eq!(json["metrics"]["totalTasks"], 3);
    assert_eq!(json["metrics"]["totalEstimatedHours"], 7.0);
    assert_eq!(json["timeline"][0]["startTime"], "2025-01-06T09:00:00Z");
    assert_eq!(json["timeline"][2]["startTime"], "2025-01-06T15:00:00Z");
    assert_eq!(json["timeline"][2]["endTime"], "2025-01-06T16:00:00Z");
    assert!(json["reasoning"]
        .as_str()
        .unwrap()
        .contains("Critical path: Design -> Build -> Test"));
}

#[test]
fn test_plan_text_output() {
    let ws = Workspace::new();
    let input = ws.write("request.json", DESIGN_BUILD_TEST);

    ws.cmd()
        .arg("plan")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recommended order (3 tasks, 7h)"))
        .stdout(predicate::str::contains("2025-01-06 15:00"))
        .stdout(predicate::str::contains("Reasoning:"));
}

#[test]
fn test_plan_now_flag_overrides_request() {
    let ws = Workspace::new();
    let input = ws.write("request.json", DESIGN_BUILD_TEST);

    ws.cmd()
        .args(["-f", "json", "plan", "--now", "2025-02-01T00:00:00Z"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"startTime\":\"2025-02-01T00:00:00Z\""))
        .stdout(predicate::str::contains("\"title\":\"Test\""));
}

#[test]
fn test_plan_flags_late_tasks() {
    let ws = Workspace::new();
    let input = ws.write(
        "late.json",
        r#"{"now": "2025-01-06T09:00:00Z", "tasks": [
            {"title": "Migration", "estimatedHours": 10, "dueDate": "2025-01-06T17:00:00Z"}
        ]}"#,
    );

    ws.cmd()
        .arg("plan")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("LATE by 2h"))
        .stdout(predicate::str::contains("At risk: 'Migration'"));
}

#[test]
fn test_plan_reads_stdin() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["-f", "json", "plan", "--now", "2025-01-06T09:00:00Z"])
        .write_stdin(r#"[{"title": "Only", "estimatedHours": 1.5}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"endTime\":\"2025-01-06T10:30:00Z\""));
}

#[test]
fn test_plan_yaml_request() {
    let ws = Workspace::new();
    let input = ws.write(
        "request.yaml",
        r#"
now: "2025-01-06T09:00:00Z"
tasks:
  - title: Design
    estimatedHours: 2
  - title: Build
    estimatedHours: 4
    dependencies: '["Design"]'
  - title: Shipped already
    estimatedHours: 3
    completionStatus: true
"#,
    );

    ws.cmd()
        .args(["-f", "json", "plan"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"recommendedOrder\":[\"Design\",\"Build\"]"));
}

#[test]
fn test_plan_yaml_from_stdin() {
    let ws = Workspace::new();
    let yaml = "\
- title: Design
  estimatedHours: 2
- title: Build
  estimatedHours: 1
  dependencies: [Design]
";

    ws.cmd()
        .args(["-f", "json", "plan", "--input-format", "yaml"])
        .args(["--now", "2025-01-06T09:00:00Z"])
        .write_stdin(yaml)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"recommendedOrder\":[\"Design\",\"Build\"]"));
}

#[test]
fn test_plan_with_completed_dependency() {
    let ws = Workspace::new();
    let input = ws.write(
        "request.json",
        r#"{"now": "2025-01-06T09:00:00Z", "tasks": [
            {"title": "Design", "estimatedHours": 2, "completionStatus": true},
            {"title": "Build", "estimatedHours": 4, "dependencies": "[\"Design\"]"}
        ]}"#,
    );

    ws.cmd()
        .args(["-f", "json", "plan"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"recommendedOrder\":[\"Build\"]"))
        .stdout(predicate::str::contains("\"endTime\":\"2025-01-06T13:00:00Z\""));
}

#[test]
fn test_plan_applies_configured_defaults() {
    let ws = Workspace::with_config("[intake]\ndefault_estimated_hours = 3\n");
    let input = ws.write(
        "request.json",
        r#"{"now": "2025-01-06T09:00:00Z", "tasks": [{"title": "Unsized"}, {}]}"#,
    );

    ws.cmd()
        .args(["-f", "json", "plan"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalEstimatedHours\":6.0"))
        .stdout(predicate::str::contains("Untitled Task"));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_cycle_is_reported() {
    let ws = Workspace::new();
    let input = ws.write(
        "cycle.json",
        r#"[
            {"title": "A", "estimatedHours": 1, "dependencies": ["B"]},
            {"title": "B", "estimatedHours": 1, "dependencies": ["A"]}
        ]"#,
    );

    ws.cmd()
        .arg("plan")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency cycle among tasks: A, B"));
}

#[test]
fn test_cycle_json_error_object() {
    let ws = Workspace::new();
    let input = ws.write(
        "cycle.json",
        r#"[
            {"title": "A", "estimatedHours": 1, "dependencies": ["B"]},
            {"title": "B", "estimatedHours": 1, "dependencies": ["A"]}
        ]"#,
    );

    let output = ws
        .cmd()
        .args(["-f", "json", "plan"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["kind"], "DependencyCycle");
    assert_eq!(json["error"]["titles"], serde_json::json!(["A", "B"]));
}

#[test]
fn test_unknown_dependency_is_reported() {
    let ws = Workspace::new();
    let input = ws.write(
        "request.json",
        r#"[{"title": "Test", "estimatedHours": 1, "dependencies": ["Build"]}]"#,
    );

    ws.cmd()
        .args(["-f", "json", "check"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"kind\":\"UnknownDependency\""));
}

#[test]
fn test_empty_request_is_not_a_validation_error() {
    let ws = Workspace::new();
    let input = ws.write("empty.json", "[]");

    ws.cmd()
        .arg("plan")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No tasks available to schedule"));
}

#[test]
fn test_all_complete_is_reported() {
    let ws = Workspace::new();
    let input = ws.write(
        "done.json",
        r#"[{"title": "Done", "estimatedHours": 1, "completionStatus": true}]"#,
    );

    ws.cmd()
        .args(["-f", "json", "plan"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"kind\":\"AllComplete\""));
}

#[test]
fn test_malformed_request() {
    let ws = Workspace::new();
    let input = ws.write("broken.json", "{not json");

    ws.cmd()
        .arg("plan")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse request"));
}

#[test]
fn test_bad_field_type_is_located() {
    let ws = Workspace::new();
    let input = ws.write("request.json", r#"[{"title": "A", "estimatedHours": "x"}]"#);

    ws.cmd()
        .arg("plan")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected f64"))
        .stderr(predicate::str::contains("untagged").not());
}

#[test]
fn test_missing_request_file() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["plan", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read request"));
}

#[test]
fn test_invalid_now_flag() {
    let ws = Workspace::new();
    let input = ws.write("request.json", DESIGN_BUILD_TEST);

    ws.cmd()
        .args(["plan", "--now", "tomorrow"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --now timestamp"));
}

// =============================================================================
// Check and config
// =============================================================================

#[test]
fn test_check_prints_order() {
    let ws = Workspace::new();
    let input = ws.write("request.json", DESIGN_BUILD_TEST);

    ws.cmd()
        .arg("check")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid: 3 tasks can be scheduled."))
        .stdout(predicate::str::contains("1. Design"));
}

#[test]
fn test_config_shows_source_and_values() {
    let ws = Workspace::with_config("default_format = \"json\"\n");

    ws.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_format\":\"json\""))
        .stdout(predicate::str::contains("taskplan.toml"));
}

#[test]
fn test_invalid_config_fails() {
    let ws = Workspace::with_config("[intake]\ndefault_estimated_hours = -2\n");

    ws.cmd()
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_help() {
    taskplan_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("check"));
}
