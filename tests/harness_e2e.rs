//! End-to-end tests of the library: bounds parsing, golden replay,
//! security batches and the runner's ordering and timeout guarantees.

#![cfg(unix)]

mod common;

use argprobe::bounds::{BoundsFormat, parse_bounds_str};
use argprobe::classify::{ExceptionDetector, GoldenTest, Stream};
use argprobe::config::HarnessConfig;
use argprobe::tester::{BasicTester, SecurityTester};
use common::{ADDER, ADDER_BOUNDS, ADDER_NEWLINE, BROKEN_ADDER, STRICT_ADDER, sh_runner};
use std::time::{Duration, Instant};

fn adder_golden() -> Vec<GoldenTest> {
    vec![GoldenTest::new(vec!["5".into(), "3".into()], "^8$", "^$").unwrap()]
}

// =============================================================================
// Golden tests
// =============================================================================

#[test]
fn adder_passes_golden_test() {
    let runner = sh_runner(ADDER, 2);
    let report = BasicTester::new(&runner, None).run(&adder_golden()).unwrap();
    assert_eq!((report.total, report.passed, report.failed), (1, 1, 0));
}

#[test]
fn trailing_newline_passes_via_stripped_output() {
    let runner = sh_runner(ADDER_NEWLINE, 2);
    let report = BasicTester::new(&runner, None).run(&adder_golden()).unwrap();
    assert_eq!(report.passed, 1);
    assert_eq!(report.executions[0].stdout, "8\n");
}

#[test]
fn wrong_sum_fails_with_stdout_mismatch() {
    let runner = sh_runner(BROKEN_ADDER, 2);
    let report = BasicTester::new(&runner, None).run(&adder_golden()).unwrap();
    assert_eq!(report.failed, 1);
    let mismatch = &report.verdicts[0].mismatches[0];
    assert_eq!(mismatch.stream, Stream::Stdout);
    assert_eq!(mismatch.actual, "9");
    assert_eq!(mismatch.expected, "^8$");
}

#[test]
fn bounds_file_tests_run_against_target() {
    let bounds = parse_bounds_str(ADDER_BOUNDS, BoundsFormat::Json).unwrap();
    let runner = sh_runner(ADDER, 4);
    let report = BasicTester::new(&runner, None).run(&bounds.tests).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.passed, 2);
}

// =============================================================================
// Security batches
// =============================================================================

#[test]
fn security_batch_finds_number_format_exceptions() {
    let bounds = parse_bounds_str(ADDER_BOUNDS, BoundsFormat::Json).unwrap();
    let config = HarnessConfig {
        iterations: 60,
        argument_count_probes: 2,
        max_argument_count: 8,
        ..HarnessConfig::default()
    };
    let runner = sh_runner(STRICT_ADDER, 4);
    let tester = SecurityTester::new(
        &runner,
        config.batch_plan(),
        None,
        ExceptionDetector::new(config.exception_markers.clone()),
    );
    let report = tester.run(&bounds.space, &bounds.corpus(), 2024).unwrap();

    assert_eq!(report.generated, 60);
    assert!(report.executed > 0 && report.executed <= report.generated);
    assert!(report.failed > 0);
    assert_eq!(
        report.errors,
        vec!["Exception in thread \"main\" java.lang.NumberFormatException: bad input".to_string()]
    );
    assert!(
        report
            .summary_yaml()
            .starts_with("Unique error count: 1\nErrors seen:\n  - |-\n    Exception in")
    );
}

#[test]
fn security_time_goal_drops_slow_runs() {
    let bounds = parse_bounds_str(ADDER_BOUNDS, BoundsFormat::Json).unwrap();
    let config = HarnessConfig {
        iterations: 40,
        argument_count_probes: 1,
        max_argument_count: 4,
        ..HarnessConfig::default()
    };
    let runner = sh_runner("exec sleep 5", 4);
    let tester = SecurityTester::new(
        &runner,
        config.batch_plan(),
        Some(Duration::from_millis(300)),
        ExceptionDetector::default(),
    );
    let started = Instant::now();
    let report = tester.run(&bounds.space, &bounds.corpus(), 1).unwrap();
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(report.executed < report.generated);
    assert_eq!(report.dropped(), report.generated - report.executed);
}

// =============================================================================
// Runner guarantees
// =============================================================================

#[test]
fn ten_runs_on_four_workers_stay_in_order() {
    let runner = sh_runner(r#"printf '%s' "$1""#, 4);
    let batch: Vec<Vec<String>> = (0..10).map(|i| vec![i.to_string()]).collect();
    let results = runner.run(&batch, None).unwrap();
    let outputs: Vec<String> = results.into_iter().map(|r| r.stdout).collect();
    let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
    assert_eq!(outputs, expected);
}

#[test]
fn short_timeout_returns_fewer_results_in_order() {
    let runner = sh_runner(r#"sleep 2; printf '%s' "$1""#, 4);
    let batch: Vec<Vec<String>> = (0..10).map(|i| vec![i.to_string()]).collect();
    let results = runner.run(&batch, Some(Duration::from_millis(200))).unwrap();
    assert!(results.len() < 10);
    let indices: Vec<usize> = results.iter().map(|r| r.stdout.parse().unwrap()).collect();
    assert!(indices.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn large_interleaved_output_does_not_deadlock() {
    let runner = sh_runner(
        "i=0; while [ $i -lt 50000 ]; do echo 'out line'; echo 'err line' >&2; i=$((i+1)); done",
        1,
    );
    let started = Instant::now();
    let results = runner.run(&[vec![]], Some(Duration::from_secs(60))).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].stdout.len(), 50000 * "out line\n".len());
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[test]
fn arguments_are_passed_verbatim() {
    let runner = sh_runner(r#"for a in "$@"; do printf '<%s>' "$a"; done"#, 1);
    let args = vec!["a b".to_string(), "$(id)".to_string(), "; ls".to_string(), String::new()];
    let results = runner.run(&[args], None).unwrap();
    assert_eq!(results[0].stdout, "<a b><$(id)><; ls><>");
}
