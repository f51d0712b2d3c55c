//! Shared helpers for integration tests.
//!
//! Targets are `/bin/sh -c` scripts; the script sees the generated
//! arguments as `$1`, `$2`, ...

#![allow(dead_code)]

use argprobe::runner::{ProgramRunner, Target};
use std::io::Write;

/// Prints the sum of its two arguments without a trailing newline.
pub const ADDER: &str = r#"printf '%s' "$(($1 + $2))""#;

/// Like [`ADDER`] but ends the output with a newline.
pub const ADDER_NEWLINE: &str = r#"echo "$(($1 + $2))""#;

/// Always prints 9.
pub const BROKEN_ADDER: &str = "printf 9";

/// Raises a Java-style uncaught exception unless both arguments are integers.
pub const STRICT_ADDER: &str = r#"
case "$1$2" in
  *[!0-9-]*|"") echo "Exception in thread \"main\" java.lang.NumberFormatException: bad input" >&2; exit 1 ;;
esac
printf '%s' "$(($1 + $2))"
"#;

pub fn sh_target(script: &str) -> Target {
    Target::new("/bin/sh").with_prefix(["-c", script, "sh"])
}

pub fn sh_runner(script: &str, threads: usize) -> ProgramRunner {
    ProgramRunner::new(sh_target(script), threads)
}

pub const ADDER_BOUNDS: &str = r#"{
    "fixed parameter list": [
        { "type": "java.lang.Integer" },
        { "type": "java.lang.Integer" }
    ],
    "tests": [
        { "parameters": ["5", "3"], "standardOutputRegex": "^8$", "standardErrorRegex": "^$" },
        { "parameters": ["-2", "2"], "standardOutputRegex": "^0$", "standardErrorRegex": "^$" }
    ]
}"#;

/// Write `content` to a temp file with the given suffix.
pub fn temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("argprobe-test-")
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}
