//! Fuzz target for bounds file parsing.
//!
//! Arbitrary text must either parse into a usable space or fail with a
//! `BoundsError`; it must never panic. Parsed spaces are walked once to
//! check that traversal stays within its depth cap.

#![no_main]

use libfuzzer_sys::fuzz_target;

use argprobe::bounds::{BoundsFormat, parse_bounds_str};
use argprobe::generators::default_arguments;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 64 * 1024 {
        return;
    }

    for format in [BoundsFormat::Json, BoundsFormat::Yaml] {
        if let Ok(bounds) = parse_bounds_str(text, format) {
            if let Ok(args) = default_arguments(&bounds.space, 32) {
                assert!(args.len() <= 32);
            }
            let _ = bounds.corpus();
        }
    }
});
