//! Boundary/overflow probes.
//!
//! Fixed spaces get three lists: a generic string in every position, a huge
//! numeric literal in every position that can hold a number, and a hugely
//! negative one.
//! Dependent spaces get one list per dependency key, passing the key itself
//! as an argument to poke at the branch dispatch.

use super::ArgList;
use crate::parameter::Parameter;
use crate::space::ParameterSpace;
use regex::Regex;
use std::sync::LazyLock;

/// Stand-in for any well-typed string argument.
pub const GENERIC_ARGUMENT: &str = "test";
/// Larger than any 32-bit integer.
pub const HUGE_NUMBER: &str = "99999999999999";
pub const HUGE_NEGATIVE_NUMBER: &str = "-99999999999999";

static KEY_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+|^\^|\$$").expect("key noise regex should compile"));

pub fn overflow_probes(space: &ParameterSpace) -> Vec<ArgList> {
    match space {
        ParameterSpace::Fixed(positions) => {
            let generic = vec![GENERIC_ARGUMENT.to_string(); positions.len()];
            let numeric_as = |literal: &str| -> ArgList {
                positions
                    .iter()
                    .map(|alternatives| {
                        if alternatives.iter().any(Parameter::has_numeric_slot) {
                            literal.to_string()
                        } else {
                            GENERIC_ARGUMENT.to_string()
                        }
                    })
                    .collect()
            };
            vec![
                generic,
                numeric_as(HUGE_NUMBER),
                numeric_as(HUGE_NEGATIVE_NUMBER),
            ]
        }
        ParameterSpace::Dependent(entries) => entries
            .iter()
            .map(|entry| {
                let label = sanitize_key(entry.key());
                let mut args = Vec::with_capacity(2);
                if !label.is_empty() {
                    args.push(label);
                }
                args.push(GENERIC_ARGUMENT.to_string());
                args
            })
            .collect(),
    }
}

/// Strip whitespace and anchors so a key reads like an argument.
fn sanitize_key(key: &str) -> String {
    KEY_NOISE.replace_all(key, "").into_owned()
}
