//! Happy-path generator.

use super::ArgList;
use crate::selector::placeholder;
use crate::space::{ParameterSpace, Step, TraversalError, traverse};

/// Walk the space taking the first candidate at every step, never skipping
/// optional parameters, with placeholder values (`1`, `1.0`, `one`).
///
/// Also serves as a structural probe: a grammar that never offers an empty
/// candidate set within `max_depth` steps is reported as an error.
pub fn default_arguments(
    space: &ParameterSpace,
    max_depth: usize,
) -> Result<ArgList, TraversalError> {
    traverse(space, max_depth, |candidates, _| {
        Step::Append(candidates[0].fill_with(|ty| placeholder(ty).into_arg()))
    })
    .map_err(|(_, e)| e)
}
