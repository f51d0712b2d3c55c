//! Black-box test generation and execution for command-line programs.
//!
//! argprobe takes a description of the arguments a program accepts (a
//! [`ParameterSpace`]) and a set of golden tests, then:
//!
//! 1. replays the golden tests and grades stdout/stderr against their
//!    expected patterns ([`tester::BasicTester`]);
//! 2. generates adversarial argument lists from the grammar and the golden
//!    corpus and runs them under a time budget, collecting uncaught-exception
//!    output ([`tester::SecurityTester`]).
//!
//! # Modules
//!
//! - [`parameter`], [`space`], [`bounds`] - the argument grammar and its file format
//! - [`value`], [`boundary`], [`selector`] - concrete values for parameter slots
//! - [`generators`] - candidate argument lists
//! - [`runner`], [`cancel`] - concurrent execution with a wall-clock budget
//! - [`classify`], [`tester`], [`report`] - grading and reporting
//! - [`config`], [`logging`], [`error`], [`output`] - ambient plumbing for the binary

pub mod boundary;
pub mod bounds;
pub mod cancel;
pub mod classify;
pub mod config;
pub mod error;
pub mod generators;
pub mod logging;
pub mod output;
pub mod parameter;
pub mod report;
pub mod runner;
pub mod selector;
pub mod space;
pub mod tester;
pub mod value;

pub use bounds::{Bounds, BoundsError, BoundsFormat, parse_bounds_file, parse_bounds_str};
pub use cancel::CancellationToken;
pub use classify::{ErrorSignatures, ExceptionDetector, Expectation, GoldenTest};
pub use config::HarnessConfig;
pub use error::{ArgprobeError, ErrorCode};
pub use parameter::{Parameter, ParameterType, TypeKind};
pub use report::{BasicReport, RunReport, SecurityReport};
pub use runner::{ExecutionResult, ProgramRunner, Target};
pub use selector::Selector;
pub use space::ParameterSpace;
pub use tester::{BasicTester, SecurityTester};
pub use value::Value;
