//! End-to-end tests of the `argprobe` binary.
//!
//! Every run gets an empty config file so the host's per-user config and
//! `ARGPROBE_*` variables cannot leak in.

#![cfg(unix)]

mod common;

use assert_cmd::Command;
use common::{ADDER, ADDER_BOUNDS, BROKEN_ADDER, STRICT_ADDER, temp_file};
use predicates::prelude::*;
use tempfile::NamedTempFile;

struct Fixture {
    bounds: NamedTempFile,
    config: NamedTempFile,
}

impl Fixture {
    fn new(bounds: &str, suffix: &str) -> Self {
        Self {
            bounds: temp_file(bounds, suffix),
            config: temp_file("", ".toml"),
        }
    }

    fn adder() -> Self {
        Self::new(ADDER_BOUNDS, ".json")
    }

    /// `argprobe --bounds B --config C [extra] -- /bin/sh -c SCRIPT sh`
    fn command(&self, script: &str, extra: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("argprobe").expect("binary built");
        for var in ["ARGPROBE_CONFIG", "ARGPROBE_THREADS", "ARGPROBE_ITERATIONS", "ARGPROBE_TIME_GOAL", "ARGPROBE_SEED", "ARGPROBE_LOG"] {
            cmd.env_remove(var);
        }
        cmd.arg("--bounds")
            .arg(self.bounds.path())
            .arg("--config")
            .arg(self.config.path())
            .args(extra)
            .args(["--", "/bin/sh", "-c", script, "sh"]);
        cmd
    }
}

#[test]
fn passing_golden_tests_exit_zero() {
    Fixture::adder()
        .command(ADDER, &["--skip-security", "--yaml-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total predefined tests run: 2"))
        .stdout(predicate::str::contains("Number of predefined tests that passed: 2"))
        .stdout(predicate::str::contains("Number of predefined tests that failed: 0"));
}

#[test]
fn failing_golden_tests_exit_one() {
    Fixture::adder()
        .command(BROKEN_ADDER, &["--skip-security", "--yaml-only"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Number of predefined tests that failed: 2"));
}

#[test]
fn full_report_lists_failures_and_table() {
    Fixture::adder()
        .command(BROKEN_ADDER, &["--skip-security", "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Test Failed!"))
        .stdout(predicate::str::contains("\t -> parameters: [5, 3]"))
        .stdout(predicate::str::contains("did not match expected stdout regex: ^8$"))
        .stdout(predicate::str::contains("Golden tests failed"));
}

#[test]
fn json_report_is_machine_readable() {
    let output = Fixture::adder()
        .command(ADDER, &["--skip-security", "--json"])
        .output()
        .expect("run argprobe");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["basic"]["total"], 2);
    assert_eq!(report["basic"]["passed"], 2);
    assert_eq!(report["interrupted"], false);
    assert!(report["security"].is_null());
}

#[test]
fn security_run_reports_unique_exceptions() {
    Fixture::adder()
        .command(STRICT_ADDER, &["--yaml-only", "--seed", "11", "-n", "40", "--threads", "4"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unique error count: 1"))
        .stdout(predicate::str::contains("java.lang.NumberFormatException: bad input"));
}

#[test]
fn dry_run_prints_seeded_batch_without_running() {
    let fixture = Fixture::adder();
    let first = fixture
        .command("exit 99", &["--dry-run", "--seed", "7", "-n", "30"])
        .output()
        .expect("run argprobe");
    assert!(first.status.success());
    let stdout = String::from_utf8(first.stdout).expect("utf-8");
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("# seed 7"));
    assert_eq!(lines.next(), Some("default\t[\"1\",\"1\"]"));
    assert!(stdout.lines().count() > 30);

    let second = fixture
        .command("exit 99", &["--dry-run", "--seed", "7", "-n", "30"])
        .output()
        .expect("run argprobe");
    assert_eq!(String::from_utf8(second.stdout).expect("utf-8"), stdout);
}

#[test]
fn yaml_bounds_files_are_accepted() {
    let bounds = r#"
fixed parameter list:
  - type: Integer
  - type: Integer
tests:
  - parameters: ["1", "1"]
    standardOutputRegex: "^2$"
    standardErrorRegex: "^$"
"#;
    Fixture::new(bounds, ".yaml")
        .command(ADDER, &["--skip-security", "--yaml-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of predefined tests that passed: 1"));
}

#[test]
fn missing_parameter_space_is_a_model_error() {
    Fixture::new(r#"{ "tests": [] }"#, ".json")
        .command(ADDER, &[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[ARG-1002]"));
}

#[test]
fn malformed_bounds_file_exits_two() {
    Fixture::new("{ not json", ".json")
        .command(ADDER, &[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[ARG-1001]"));
}

#[test]
fn unsupported_bounds_extension_exits_two() {
    Fixture::new("{}", ".xml")
        .command(ADDER, &[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[ARG-2004]"));
}

#[test]
fn errors_are_json_under_json_flag() {
    let output = Fixture::new(r#"{ "tests": [] }"#, ".json")
        .command(ADDER, &["--json"])
        .output()
        .expect("run argprobe");
    assert_eq!(output.status.code(), Some(2));
    let response: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(response["code"], "ARG-1002");
    assert_eq!(response["category"], "model");
}

#[test]
fn invalid_config_value_is_reported() {
    let fixture = Fixture::adder();
    std::fs::write(fixture.config.path(), "threads = 0\n").expect("write config");
    fixture
        .command(ADDER, &[])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[ARG-2003]"));
}

#[test]
fn command_line_flag_wins_over_invalid_environment() {
    let fixture = Fixture::adder();
    fixture
        .command(ADDER, &["--skip-security", "--yaml-only", "--threads", "4"])
        .env("ARGPROBE_THREADS", "0")
        .assert()
        .success();
    fixture
        .command(ADDER, &["--skip-security", "--yaml-only"])
        .env("ARGPROBE_THREADS", "0")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[ARG-2003]"));
}
