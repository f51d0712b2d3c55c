//! Execution harness.
//!
//! Runs argument lists against the target on a bounded worker pool and
//! collects their output.
//!
//! # Architecture
//!
//! ```text
//!   batch ──► rayon pool (N workers) ──► one child process per input
//!                 ▲                          │
//!                 │                   stdout reader thread
//!   watchdog ── token                 stderr reader thread
//! ```
//!
//! - Results come back in submission order.
//! - A watchdog thread trips the batch token once the timeout elapses.
//!   Workers stop picking up inputs and kill children still running; those
//!   positions are dropped from the result list rather than reported. An
//!   invocation whose pipes are still held open by a descendant when the
//!   token trips is dropped the same way.
//! - An input whose process cannot be launched yields no result and does not
//!   affect the rest of the batch.
//! - stdout and stderr are drained by two independent threads so a target
//!   that fills one pipe cannot stall on the other.

use crate::cancel::CancellationToken;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Default delay between child status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The executable under test, plus arguments that precede every input
/// (for example `java -jar app.jar`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub program: PathBuf,
    pub prefix_args: Vec<String>,
}

impl Target {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_prefix<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.prefix_args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output captured from one completed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub args: Vec<String>,
    pub stdout: String,
    /// `None` when the stream could not be read.
    pub stderr: Option<String>,
    pub exit_code: Option<i32>,
    #[serde(skip)]
    pub duration: Duration,
}

/// Failures that prevent a batch from running at all.
#[derive(Debug)]
pub enum RunnerError {
    /// The worker pool could not be built.
    Pool(rayon::ThreadPoolBuildError),
    /// The watchdog thread could not be spawned.
    Watchdog(io::Error),
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool(e) => write!(f, "failed to build worker pool: {e}"),
            Self::Watchdog(e) => write!(f, "failed to start timeout watchdog: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pool(e) => Some(e),
            Self::Watchdog(e) => Some(e),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for RunnerError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::Pool(e)
    }
}

/// Runs batches of argument lists against one target.
#[derive(Debug, Clone)]
pub struct ProgramRunner {
    target: Target,
    threads: usize,
    poll_interval: Duration,
    interrupt: CancellationToken,
}

impl ProgramRunner {
    #[must_use]
    pub fn new(target: Target, threads: usize) -> Self {
        Self {
            target,
            threads: threads.max(1),
            poll_interval: DEFAULT_POLL_INTERVAL,
            interrupt: CancellationToken::new(),
        }
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Token that cancels every batch run by this runner (e.g. on Ctrl-C).
    #[must_use]
    pub fn interrupt_token(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }

    /// Run every input and return the results in input order.
    ///
    /// With a non-zero `timeout`, inputs not finished when it elapses are
    /// cancelled and left out, so the result list may be shorter than
    /// `batch`.
    pub fn run(
        &self,
        batch: &[Vec<String>],
        timeout: Option<Duration>,
    ) -> Result<Vec<ExecutionResult>, RunnerError> {
        let results: Vec<ExecutionResult> =
            self.run_slots(batch, timeout)?.into_iter().flatten().collect();
        if results.len() < batch.len() {
            tracing::warn!(
                submitted = batch.len(),
                completed = results.len(),
                "some invocations produced no result"
            );
        }
        Ok(results)
    }

    /// Like [`Self::run`], but keeps one slot per input; `None` marks an
    /// input that was cancelled or could not be launched.
    pub fn run_slots(
        &self,
        batch: &[Vec<String>],
        timeout: Option<Duration>,
    ) -> Result<Vec<Option<ExecutionResult>>, RunnerError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("argprobe-worker-{i}"))
            .build()?;

        let token = self.interrupt.child();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let watchdog = match timeout.filter(|t| !t.is_zero()) {
            Some(limit) => {
                let token = token.clone();
                let handle = thread::Builder::new()
                    .name("argprobe-watchdog".to_string())
                    .spawn(move || {
                        if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(limit) {
                            tracing::info!(
                                limit_secs = limit.as_secs_f64(),
                                "time limit exceeded, cancelling remaining invocations"
                            );
                            token.cancel();
                        }
                    })
                    .map_err(RunnerError::Watchdog)?;
                Some(handle)
            }
            None => None,
        };

        let outcomes: Vec<Option<ExecutionResult>> = pool.install(|| {
            batch
                .par_iter()
                .map(|args| {
                    if token.is_cancelled() {
                        return None;
                    }
                    self.execute(args, &token)
                })
                .collect()
        });

        let _ = done_tx.send(());
        if let Some(handle) = watchdog {
            let _ = handle.join();
        }

        Ok(outcomes)
    }

    fn execute(&self, args: &[String], token: &CancellationToken) -> Option<ExecutionResult> {
        tracing::debug!(program = %self.target, ?args, "launching");
        let started = Instant::now();
        let mut child = match self.target.command(args).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program = %self.target, error = %e, "failed to launch target");
                return None;
            }
        };

        let (output_tx, output_rx) = mpsc::channel();
        let readers = spawn_reader(Pipe::Stdout, child.stdout.take(), output_tx.clone())
            && spawn_reader(Pipe::Stderr, child.stderr.take(), output_tx);
        if !readers {
            kill(&mut child);
            return None;
        }

        let status = self.wait_or_cancel(&mut child, token)?;
        let (stdout, stderr) = self.collect_output(&output_rx, token)?;
        Some(ExecutionResult {
            args: args.to_vec(),
            stdout: stdout.unwrap_or_default(),
            stderr,
            exit_code: status.code(),
            duration: started.elapsed(),
        })
    }

    /// Wait for the child to exit, killing it if the batch is cancelled first.
    fn wait_or_cancel(&self, child: &mut Child, token: &CancellationToken) -> Option<ExitStatus> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Some(status),
                Ok(None) if token.is_cancelled() => {
                    tracing::debug!(pid = child.id(), "cancelling in-flight invocation");
                    kill(child);
                    return None;
                }
                Ok(None) => thread::sleep(self.poll_interval),
                Err(e) => {
                    tracing::warn!(pid = child.id(), error = %e, "failed to wait for target");
                    kill(child);
                    return None;
                }
            }
        }
    }

    /// Wait for both pipes to close. A descendant of the target can keep them
    /// open after the target exits; if the batch is cancelled first the
    /// invocation counts as unfinished and its reader threads are abandoned.
    fn collect_output(
        &self,
        output: &mpsc::Receiver<(Pipe, Option<String>)>,
        token: &CancellationToken,
    ) -> Option<(Option<String>, Option<String>)> {
        let mut stdout = None;
        let mut stderr = None;
        let mut pending = 2;
        while pending > 0 {
            match output.recv_timeout(self.poll_interval) {
                Ok((Pipe::Stdout, text)) => {
                    stdout = text;
                    pending -= 1;
                }
                Ok((Pipe::Stderr, text)) => {
                    stderr = text;
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout) if token.is_cancelled() => {
                    tracing::debug!("pipes still open at cancellation, dropping invocation");
                    return None;
                }
                Err(RecvTimeoutError::Timeout) => {}
                // A reader died without reporting; treat its stream as unreadable.
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Some((stdout, stderr))
    }
}

#[derive(Debug, Clone, Copy)]
enum Pipe {
    Stdout,
    Stderr,
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_reader<R>(pipe: Pipe, stream: Option<R>, output: mpsc::Sender<(Pipe, Option<String>)>) -> bool
where
    R: Read + Send + 'static,
{
    let Some(mut stream) = stream else {
        return false;
    };
    let name = match pipe {
        Pipe::Stdout => "argprobe-stdout",
        Pipe::Stderr => "argprobe-stderr",
    };
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            let text = match stream.read_to_end(&mut buf) {
                Ok(_) => Some(String::from_utf8_lossy(&buf).into_owned()),
                Err(e) => {
                    tracing::debug!(error = %e, "failed to read target output");
                    None
                }
            };
            // The worker may have given up on this invocation already.
            let _ = output.send((pipe, text));
        })
        .map_err(|e| tracing::warn!(error = %e, "failed to spawn output reader"))
        .is_ok()
}
