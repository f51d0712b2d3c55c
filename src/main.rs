//! argprobe command-line entry point.
//!
//! Exit behavior:
//!   - 0: every golden test passed and no run raised an uncaught exception
//!   - 1: at least one golden failure or exceptional run
//!   - 2: the run could not start (bad bounds file, config, ...)
//!   - 130: interrupted; the partial report is still printed

use argprobe::bounds::parse_bounds_file;
use argprobe::classify::ExceptionDetector;
use argprobe::config::{HarnessConfig, Overrides};
use argprobe::error::ArgprobeError;
use argprobe::generators::default_arguments;
use argprobe::output;
use argprobe::report::RunReport;
use argprobe::runner::{ProgramRunner, Target};
use argprobe::tester::{BasicTester, SecurityTester};
use argprobe::logging;
use chrono::Utc;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "argprobe",
    version,
    about = "Black-box test generator and runner for command-line programs",
    long_about = "Replays golden tests from a bounds file against a program, then drives it \
                  with generated boundary, type-confusion, argument-count and corrupted \
                  inputs under a time budget, reporting uncaught exceptions.",
    after_help = "Example:\n  argprobe --bounds adder.json -- java -jar adder.jar"
)]
struct Cli {
    /// Bounds file (JSON or YAML) describing parameters and golden tests
    #[arg(long, short = 'b', value_name = "FILE")]
    bounds: PathBuf,

    /// Config file (default: $ARGPROBE_CONFIG, then the per-user config.toml)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Worker threads
    #[arg(long, short = 't')]
    threads: Option<usize>,

    /// Security-test iteration budget
    #[arg(long, short = 'n')]
    iterations: Option<usize>,

    /// Security-test time goal in seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    time_goal: Option<u64>,

    /// Timeout for the golden tests in seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    basic_timeout: Option<u64>,

    /// Random seed for reproducible security batches
    #[arg(long)]
    seed: Option<u64>,

    /// Only run the golden tests
    #[arg(long)]
    skip_security: bool,

    /// Print generated inputs without running the program
    #[arg(long)]
    dry_run: bool,

    /// Only print the YAML summary
    #[arg(long, conflicts_with = "json")]
    yaml_only: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Print stdout/stderr of every execution
    #[arg(long)]
    show_output: bool,

    /// Disable colors
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Program to test
    #[arg(value_name = "PROGRAM", required = true)]
    program: PathBuf,

    /// Arguments placed before every generated argument list
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    prefix: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    output::init(cli.no_color || cli.json || cli.yaml_only);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                match serde_json::to_string_pretty(&e.to_response()) {
                    Ok(json) => println!("{json}"),
                    Err(_) => eprintln!("error[{}]: {e}", e.code()),
                }
            } else {
                eprintln!("error[{}]: {e}", e.code());
            }
            ExitCode::from(2)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<HarnessConfig, ArgprobeError> {
    let overrides = Overrides {
        threads: cli.threads,
        iterations: cli.iterations,
        time_goal_secs: cli.time_goal,
        basic_timeout_secs: cli.basic_timeout,
        seed: cli.seed,
    };
    Ok(HarnessConfig::resolve(cli.config.as_deref(), overrides)?)
}

fn run(cli: &Cli) -> Result<ExitCode, ArgprobeError> {
    let config = resolve_config(cli)?;
    let bounds = parse_bounds_file(&cli.bounds)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, threads = config.threads, "starting");

    if cli.dry_run {
        return dry_run(&config, &bounds, seed);
    }

    let target = Target::new(&cli.program).with_prefix(cli.prefix.iter().cloned());
    let runner = ProgramRunner::new(target, config.threads).with_poll_interval(config.poll_interval());
    let interrupt = runner.interrupt_token();
    ctrlc::set_handler(move || interrupt.cancel())?;

    let started_at = Utc::now();
    let basic = BasicTester::new(&runner, config.basic_timeout()).run(&bounds.tests)?;

    let interrupted = || runner.interrupt_token().is_cancelled();
    let security = if cli.skip_security || interrupted() {
        None
    } else {
        let tester = SecurityTester::new(
            &runner,
            config.batch_plan(),
            config.time_goal(),
            ExceptionDetector::new(config.exception_markers.clone()),
        );
        Some(tester.run(&bounds.space, &bounds.corpus(), seed)?)
    };

    let report = RunReport {
        target: runner.target().to_string(),
        started_at,
        finished_at: Utc::now(),
        basic,
        security,
        interrupted: interrupted(),
    };
    print_report(cli, &report)?;

    let failures = report.basic.failed + report.security.as_ref().map_or(0, |s| s.failed);
    Ok(if report.interrupted {
        ExitCode::from(130)
    } else if failures > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(cli: &Cli, report: &RunReport) -> Result<(), ArgprobeError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.json {
        writeln!(out, "{}", report.to_json()?)?;
        return Ok(());
    }
    if cli.yaml_only {
        writeln!(out, "{}", report.summary_yaml())?;
        return Ok(());
    }

    if cli.show_output {
        write!(out, "{}", report.execution_log())?;
    }
    write!(out, "{}", report.basic.failure_details(output::should_use_rich_output()))?;
    if report.interrupted {
        writeln!(out, "interrupted: report covers completed runs only")?;
    }
    writeln!(
        out,
        "{}",
        output::summary_table(report, output::auto_table_style(), output::terminal_width())
    )?;
    writeln!(out, "{}", report.summary_yaml())?;
    Ok(())
}

/// Print the inputs a run would generate, one JSON array per line.
fn dry_run(
    config: &HarnessConfig,
    bounds: &argprobe::Bounds,
    seed: u64,
) -> Result<ExitCode, ArgprobeError> {
    // Dependent grammars may never offer an empty candidate set
    if !bounds.space.is_bounded() {
        default_arguments(&bounds.space, config.max_traversal_depth)?;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let batch = config.batch_plan().build(&bounds.space, &bounds.corpus(), &mut rng);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "# seed {seed}")?;
    for (origin, args) in batch.origins.iter().zip(&batch.inputs) {
        writeln!(out, "{origin}\t{}", serde_json::to_string(args)?)?;
    }
    Ok(ExitCode::SUCCESS)
}
