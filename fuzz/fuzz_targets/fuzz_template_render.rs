//! Fuzz target for formatted parameters.
//!
//! Checks that rendering with exactly one value per placeholder always
//! succeeds, that any other count is rejected, and that arbitrary dependency
//! keys compile or fail cleanly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use argprobe::parameter::Parameter;
use argprobe::space::{DependentEntry, ParameterSpace};

#[derive(Debug, Arbitrary)]
struct Input {
    template: String,
    values: Vec<String>,
    key: String,
    prefix: Vec<String>,
}

fuzz_target!(|input: Input| {
    if input.template.len() > 4096 || input.key.len() > 256 {
        return;
    }

    let parameter = Parameter::formatted(input.template, false);
    let rendered = parameter.render(&input.values);
    assert_eq!(rendered.is_ok(), input.values.len() == parameter.arity());

    if let Ok(entry) = DependentEntry::new(input.key, vec![parameter]) {
        let space = ParameterSpace::Dependent(vec![entry]);
        let _ = space.next(&input.prefix);
    }
});
