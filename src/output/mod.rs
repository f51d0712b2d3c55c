//! Terminal output for argprobe.
//!
//! # TTY Detection
//!
//! Colour and box-drawing output is used only when:
//! 1. it was not disabled explicitly (`--no-color`, `--json`)
//! 2. `NO_COLOR` is unset
//! 3. stdout is a TTY
//! 4. `TERM` is not "dumb"

pub mod tables;

pub use tables::{TableStyle, summary_table};

use std::sync::OnceLock;

/// Set once by the binary to force plain output.
static FORCE_PLAIN: OnceLock<bool> = OnceLock::new();

pub fn init(force_plain: bool) {
    let _ = FORCE_PLAIN.set(force_plain);
    if force_plain {
        colored::control::set_override(false);
    }
}

#[must_use]
pub fn should_use_rich_output() -> bool {
    if FORCE_PLAIN.get().copied().unwrap_or(false) {
        return false;
    }

    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if !console::Term::stdout().is_term() {
        return false;
    }

    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

/// Table style matching [`should_use_rich_output`].
#[must_use]
pub fn auto_table_style() -> TableStyle {
    if should_use_rich_output() {
        TableStyle::Unicode
    } else {
        TableStyle::Ascii
    }
}

#[must_use]
pub fn terminal_width() -> u16 {
    console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w)
        .unwrap_or(80)
}
