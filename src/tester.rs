//! Test orchestration.
//!
//! [`BasicTester`] replays golden tests and grades them against their
//! expected output. [`SecurityTester`] generates an adversarial batch from the
//! grammar and the golden corpus, runs it under the time goal and collects
//! uncaught-exception output.

use crate::classify::{ErrorSignatures, ExceptionDetector, GoldenTest, classify_basic};
use crate::generators::{ArgList, BatchPlan};
use crate::report::{BasicReport, GeneratorCount, SecurityReport};
use crate::runner::{ProgramRunner, RunnerError};
use crate::space::ParameterSpace;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::time::Duration;

pub struct BasicTester<'a> {
    runner: &'a ProgramRunner,
    timeout: Option<Duration>,
}

impl<'a> BasicTester<'a> {
    #[must_use]
    pub const fn new(runner: &'a ProgramRunner, timeout: Option<Duration>) -> Self {
        Self { runner, timeout }
    }

    pub fn run(&self, tests: &[GoldenTest]) -> Result<BasicReport, RunnerError> {
        let batch: Vec<ArgList> = tests.iter().map(|t| t.args.clone()).collect();
        let slots = self.runner.run_slots(&batch, self.timeout)?;

        let mut verdicts = Vec::with_capacity(tests.len());
        let mut executions = Vec::with_capacity(tests.len());
        let mut not_run = 0;
        for (test, slot) in tests.iter().zip(slots) {
            match slot {
                Some(result) => {
                    verdicts.push(classify_basic(test, &result));
                    executions.push(result);
                }
                None => not_run += 1,
            }
        }

        let report = BasicReport::from_verdicts(verdicts, executions, not_run);
        tracing::info!(
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            not_run,
            "basic tests finished"
        );
        Ok(report)
    }
}

pub struct SecurityTester<'a> {
    runner: &'a ProgramRunner,
    plan: BatchPlan,
    time_goal: Option<Duration>,
    detector: ExceptionDetector,
}

impl<'a> SecurityTester<'a> {
    #[must_use]
    pub const fn new(
        runner: &'a ProgramRunner,
        plan: BatchPlan,
        time_goal: Option<Duration>,
        detector: ExceptionDetector,
    ) -> Self {
        Self {
            runner,
            plan,
            time_goal,
            detector,
        }
    }

    /// Generate, run and grade one security batch.
    ///
    /// All randomness derives from `seed`, so the same seed regenerates the
    /// same inputs.
    pub fn run(
        &self,
        space: &ParameterSpace,
        corpus: &[ArgList],
        seed: u64,
    ) -> Result<SecurityReport, RunnerError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let batch = self.plan.build(space, corpus, &mut rng);
        let results = self.runner.run(&batch.inputs, self.time_goal)?;

        let signatures = ErrorSignatures::new();
        let failed = results
            .par_iter()
            .filter(|result| self.detector.is_exceptional(result.stderr.as_deref()))
            .inspect(|result| {
                if let Some(stderr) = result.stderr.as_deref() {
                    signatures.insert(stderr);
                }
            })
            .count();

        let report = SecurityReport {
            seed,
            generated: batch.len(),
            executed: results.len(),
            passed: results.len() - failed,
            failed,
            by_generator: batch
                .counts()
                .into_iter()
                .map(|(generator, count)| GeneratorCount { generator, count })
                .collect(),
            errors: signatures.into_sorted(),
            executions: results,
        };
        tracing::info!(
            generated = report.generated,
            executed = report.executed,
            failed = report.failed,
            unique_errors = report.unique_errors(),
            "security tests finished"
        );
        Ok(report)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::generators::ArgumentCountGenerator;
    use crate::parameter::{Parameter, ParameterType};
    use crate::runner::Target;

    fn sh(script: &str) -> ProgramRunner {
        ProgramRunner::new(Target::new("/bin/sh").with_prefix(["-c", script, "sh"]), 4)
    }

    fn plan(iterations: usize) -> BatchPlan {
        BatchPlan {
            iterations,
            corrupted_share: 3,
            max_depth: 16,
            argument_count: ArgumentCountGenerator::new(1, 5),
        }
    }

    fn space() -> ParameterSpace {
        ParameterSpace::fixed([Parameter::typed(ParameterType::integer(), false)])
    }

    #[test]
    fn basic_tester_grades_each_golden_test() {
        let runner = sh(r#"printf '%s' "$1""#);
        let tests = vec![
            GoldenTest::new(vec!["8".into()], "^8$", "^$").unwrap(),
            GoldenTest::new(vec!["9".into()], "^8$", "^$").unwrap(),
        ];
        let report = BasicTester::new(&runner, None).run(&tests).unwrap();
        assert_eq!((report.total, report.passed, report.failed), (2, 1, 1));
        assert!(report.verdicts[0].passed);
        assert!(!report.verdicts[1].passed);
        assert_eq!(report.executions.len(), 2);
    }

    #[test]
    fn basic_tester_counts_unlaunchable_tests_as_not_run() {
        let runner = sh(r#"printf '%s' "$1""#);
        let tests = vec![
            GoldenTest::new(vec!["8".into()], "^8$", "^$").unwrap(),
            GoldenTest::new(vec!["\0".into()], "^$", "^$").unwrap(),
        ];
        let report = BasicTester::new(&runner, None).run(&tests).unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.not_run, 1);
    }

    #[test]
    fn security_tester_collects_unique_exceptions() {
        let runner = sh(r#"case "$1" in *[!0-9-]*|"") echo "Exception in thread main: bad $#" >&2 ;; *) echo ok ;; esac"#);
        let tester = SecurityTester::new(&runner, plan(40), None, ExceptionDetector::default());
        let corpus = vec![vec!["12".to_string()]];
        let report = tester.run(&space(), &corpus, 99).unwrap();

        assert_eq!(report.generated, 40);
        assert_eq!(report.executed, 40);
        assert_eq!(report.passed + report.failed, 40);
        assert!(report.failed > 0);
        assert!(!report.errors.is_empty());
        assert!(report.errors.iter().all(|e| e.starts_with("Exception in")));
        assert!(report.errors.len() <= report.failed);
        assert_eq!(report.seed, 99);
    }

    #[test]
    fn same_seed_same_batch() {
        let runner = sh(r#"printf '%s' "$*""#);
        let tester = SecurityTester::new(&runner, plan(20), None, ExceptionDetector::default());
        let a = tester.run(&space(), &[], 5).unwrap();
        let b = tester.run(&space(), &[], 5).unwrap();
        let args = |r: &SecurityReport| r.executions.iter().map(|e| e.args.clone()).collect::<Vec<_>>();
        assert_eq!(args(&a), args(&b));
    }
}
