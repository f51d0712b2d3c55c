//! Test reports.
//!
//! [`BasicReport`] and [`SecurityReport`] hold the outcome of the two phases;
//! [`RunReport`] bundles them with run metadata. Each renders as the
//! YAML-style summary block, as JSON, or as human-oriented text.

use crate::classify::BasicVerdict;
use crate::generators::Origin;
use crate::runner::ExecutionResult;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;

/// Separator printed between failure blocks.
pub const HORIZONTAL_LINE: &str =
    "-----------------------------------------------------------------------------------------";

#[derive(Debug, Clone, Default, Serialize)]
pub struct BasicReport {
    /// Golden tests that produced a result.
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Golden tests cancelled or not launched.
    pub not_run: usize,
    pub verdicts: Vec<BasicVerdict>,
    #[serde(skip)]
    pub executions: Vec<ExecutionResult>,
}

impl BasicReport {
    #[must_use]
    pub fn from_verdicts(verdicts: Vec<BasicVerdict>, executions: Vec<ExecutionResult>, not_run: usize) -> Self {
        let passed = verdicts.iter().filter(|v| v.passed).count();
        Self {
            total: verdicts.len(),
            passed,
            failed: verdicts.len() - passed,
            not_run,
            verdicts,
            executions,
        }
    }

    /// Pass percentage, or `None` when nothing ran.
    #[must_use]
    pub fn pass_rate(&self) -> Option<f64> {
        percentage(self.passed, self.total)
    }

    #[must_use]
    pub fn summary_yaml(&self) -> String {
        format!(
            "Total predefined tests run: {}\nNumber of predefined tests that passed: {}\nNumber of predefined tests that failed: {}",
            self.total, self.passed, self.failed
        )
    }

    /// Failure blocks followed by the one-line tally.
    #[must_use]
    pub fn failure_details(&self, color: bool) -> String {
        let mut out = String::new();
        for verdict in self.verdicts.iter().filter(|v| !v.passed) {
            let heading = "Test Failed!";
            if color {
                let _ = writeln!(out, "{}", heading.red().bold());
            } else {
                let _ = writeln!(out, "{heading}");
            }
            let _ = writeln!(out, "\t -> parameters: {}", format_args(&verdict.args));
            for mismatch in &verdict.mismatches {
                let _ = writeln!(out, "{mismatch}");
            }
            let _ = writeln!(out, "{HORIZONTAL_LINE}");
        }
        let _ = writeln!(
            out,
            "basic test results: {} total, {} pass, {} fail",
            self.total, self.passed, self.failed
        );
        out
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SecurityReport {
    pub seed: u64,
    /// Inputs submitted to the runner.
    pub generated: usize,
    /// Inputs that produced a result before the time goal.
    pub executed: usize,
    pub passed: usize,
    pub failed: usize,
    pub by_generator: Vec<GeneratorCount>,
    /// Unique trimmed stderr texts of exceptional runs, sorted.
    pub errors: Vec<String>,
    #[serde(skip)]
    pub executions: Vec<ExecutionResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeneratorCount {
    pub generator: Origin,
    pub count: usize,
}

impl SecurityReport {
    /// Inputs dropped by the time goal or launch failures.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.generated.saturating_sub(self.executed)
    }

    #[must_use]
    pub fn unique_errors(&self) -> usize {
        self.errors.len()
    }

    /// The `Unique error count` / `Errors seen` block.
    ///
    /// Errors that would not survive as plain YAML scalars (multi-line, or
    /// containing `: ` or ` #`) are written as `|-` literal blocks.
    #[must_use]
    pub fn summary_yaml(&self) -> String {
        let mut out = format!("Unique error count: {}\n", self.errors.len());
        if self.errors.is_empty() {
            out.push_str("Errors seen: []");
            return out;
        }
        out.push_str("Errors seen:\n");
        for error in &self.errors {
            let error = error.trim();
            if needs_literal_block(error) {
                out.push_str("  - |-\n");
                for line in error.lines() {
                    let _ = writeln!(out, "    {}", line.trim_end_matches('\r'));
                }
            } else {
                let _ = writeln!(out, "  - {error}");
            }
        }
        out
    }
}

fn needs_literal_block(text: &str) -> bool {
    text.contains('\n')
        || text.contains(": ")
        || text.contains(" #")
        || text.starts_with(['-', '?', ':', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`'])
}

/// Everything one invocation of the tool produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub basic: BasicReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityReport>,
    /// Set when the run was stopped early by an interrupt.
    pub interrupted: bool,
}

impl RunReport {
    #[must_use]
    pub fn summary_yaml(&self) -> String {
        let mut out = self.basic.summary_yaml();
        if let Some(security) = &self.security {
            out.push('\n');
            out.push_str(&security.summary_yaml());
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// stdout/stderr of every execution, in run order.
    #[must_use]
    pub fn execution_log(&self) -> String {
        let mut out = String::new();
        let security = self.security.iter().flat_map(|s| s.executions.iter());
        for execution in self.basic.executions.iter().chain(security) {
            let _ = writeln!(out, "parameters: {}", format_args(&execution.args));
            let _ = writeln!(out, "stdout of execution: {}", execution.stdout);
            let _ = writeln!(
                out,
                "stderr of execution: {}",
                execution.stderr.as_deref().unwrap_or("<unavailable>")
            );
            let _ = writeln!(out, "{HORIZONTAL_LINE}");
        }
        out
    }
}

fn percentage(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 * 100.0 / whole as f64)
}

/// `[a, b, c]`, the way argument lists appear in failure blocks.
#[must_use]
pub fn format_args(args: &[String]) -> String {
    format!("[{}]", args.join(", "))
}
