//! Result classification.
//!
//! Two modes:
//!
//! - **Basic**: a golden test passes when stdout and stderr fully match their
//!   expected patterns. Each stream is tried raw and with every CR/LF removed.
//! - **Security**: a run is exceptional when stderr starts with an
//!   uncaught-exception marker. Exceptional stderr is collected, trimmed and
//!   deduplicated, in an [`ErrorSignatures`] set.
//!
//! # Legacy stdout quirk
//!
//! Older expectations were written against a checker that also accepted the
//! CR/LF-stripped stdout when it fully matched the *stderr* pattern. That
//! behaviour is kept so existing golden files grade the same way;
//! [`StreamCheck::via_stderr_pattern`] reports when a pass relied on it.

use crate::runner::ExecutionResult;
use fancy_regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

/// Marker used when no others are configured.
pub const DEFAULT_EXCEPTION_MARKER: &str = "Exception in";

/// A regex compiled for full-string matching.
#[derive(Debug, Clone)]
pub struct Expectation {
    source: String,
    anchored: Regex,
}

impl Expectation {
    pub fn new(pattern: impl Into<String>) -> Result<Self, fancy_regex::Error> {
        let source = pattern.into();
        let anchored = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source, anchored })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Full match. A pattern that fails to evaluate does not match.
    #[must_use]
    pub fn full_match(&self, text: &str) -> bool {
        match self.anchored.is_match(text) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::debug!(pattern = %self.source, error = %e, "expectation failed to evaluate");
                false
            }
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A known-good invocation with its expected output.
#[derive(Debug, Clone)]
pub struct GoldenTest {
    pub args: Vec<String>,
    pub stdout: Expectation,
    pub stderr: Expectation,
}

impl GoldenTest {
    pub fn new(
        args: Vec<String>,
        stdout: &str,
        stderr: &str,
    ) -> Result<Self, fancy_regex::Error> {
        Ok(Self {
            args,
            stdout: Expectation::new(stdout)?,
            stderr: Expectation::new(stderr)?,
        })
    }
}

/// Which output stream a mismatch refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Outcome of checking one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamCheck {
    pub passed: bool,
    /// Passed only because the stripped stdout matched the stderr pattern.
    pub via_stderr_pattern: bool,
}

/// One stream that did not match its expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub stream: Stream,
    pub actual: String,
    pub expected: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t -> {}: {}", self.stream, self.actual)?;
        write!(
            f,
            "\t -> did not match expected {} regex: {}",
            self.stream, self.expected
        )
    }
}

/// Grade of one golden test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicVerdict {
    pub args: Vec<String>,
    pub passed: bool,
    /// Empty when the test passed.
    pub mismatches: Vec<Mismatch>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub legacy_match: bool,
}

fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// Check stdout against the test, including the legacy stderr-pattern path.
#[must_use]
pub fn check_stdout(test: &GoldenTest, stdout: &str) -> StreamCheck {
    let stripped = strip_line_breaks(stdout);
    if test.stdout.full_match(stdout) || test.stdout.full_match(&stripped) {
        return StreamCheck {
            passed: true,
            via_stderr_pattern: false,
        };
    }
    let legacy = test.stderr.full_match(&stripped);
    StreamCheck {
        passed: legacy,
        via_stderr_pattern: legacy,
    }
}

#[must_use]
pub fn check_stderr(test: &GoldenTest, stderr: &str) -> StreamCheck {
    StreamCheck {
        passed: test.stderr.full_match(stderr) || test.stderr.full_match(&strip_line_breaks(stderr)),
        via_stderr_pattern: false,
    }
}

/// Grade a golden test against the run it produced.
///
/// Unreadable stderr is graded as empty.
#[must_use]
pub fn classify_basic(test: &GoldenTest, result: &ExecutionResult) -> BasicVerdict {
    let stderr = result.stderr.as_deref().unwrap_or_default();
    let out = check_stdout(test, &result.stdout);
    let err = check_stderr(test, stderr);

    let mut mismatches = Vec::new();
    if !out.passed {
        mismatches.push(Mismatch {
            stream: Stream::Stdout,
            actual: result.stdout.clone(),
            expected: test.stdout.as_str().to_string(),
        });
    }
    if !err.passed {
        mismatches.push(Mismatch {
            stream: Stream::Stderr,
            actual: stderr.to_string(),
            expected: test.stderr.as_str().to_string(),
        });
    }
    if out.via_stderr_pattern {
        tracing::debug!(args = ?test.args, "stdout accepted by the stderr pattern");
    }

    BasicVerdict {
        args: test.args.clone(),
        passed: mismatches.is_empty(),
        mismatches,
        legacy_match: out.via_stderr_pattern,
    }
}

/// Detects uncaught-exception output on stderr.
#[derive(Debug, Clone)]
pub struct ExceptionDetector {
    markers: Vec<String>,
}

impl Default for ExceptionDetector {
    fn default() -> Self {
        Self::new(vec![DEFAULT_EXCEPTION_MARKER.to_string()])
    }
}

impl ExceptionDetector {
    #[must_use]
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    #[must_use]
    pub fn is_exceptional(&self, stderr: Option<&str>) -> bool {
        match stderr {
            Some(text) if !text.is_empty() => {
                self.markers.iter().any(|marker| text.starts_with(marker.as_str()))
            }
            _ => false,
        }
    }
}

/// Deduplicated, trimmed stderr texts of exceptional runs.
///
/// Safe to fill from several worker threads at once.
#[derive(Debug, Default)]
pub struct ErrorSignatures {
    seen: Mutex<HashSet<String>>,
}

impl ErrorSignatures {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `stderr` and return true if it was not seen before.
    pub fn insert(&self, stderr: &str) -> bool {
        let signature = stderr.trim().to_string();
        match self.seen.lock() {
            Ok(mut seen) => seen.insert(signature),
            Err(poisoned) => poisoned.into_inner().insert(signature),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self.seen.lock() {
            Ok(seen) => seen.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The signatures in sorted order.
    #[must_use]
    pub fn into_sorted(self) -> Vec<String> {
        let seen = match self.seen.into_inner() {
            Ok(seen) => seen,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut out: Vec<String> = seen.into_iter().collect();
        out.sort();
        out
    }
}
