//! Random walks over the parameter space.

use super::ArgList;
use crate::selector::Selector;
use crate::space::{ParameterSpace, Step, traverse};
use rand::Rng;

/// Builds one argument list per call by walking the grammar with random
/// choices: a uniformly random candidate at each step, a coin flip to stop
/// at optional parameters, and a uniformly random [`Selector`] per slot.
#[derive(Debug, Clone, Copy)]
pub struct RandomParameterGenerator<'a> {
    space: &'a ParameterSpace,
    max_depth: usize,
}

impl<'a> RandomParameterGenerator<'a> {
    #[must_use]
    pub const fn new(space: &'a ParameterSpace, max_depth: usize) -> Self {
        Self { space, max_depth }
    }

    pub fn next_input<R: Rng + ?Sized>(&self, rng: &mut R) -> ArgList {
        let walk = traverse(self.space, self.max_depth, |candidates, _| {
            let param = candidates[rng.gen_range(0..candidates.len())];
            if param.is_optional() && rng.r#gen::<bool>() {
                return Step::Stop;
            }
            Step::Append(param.fill_with(|ty| {
                let selector = Selector::FUZZING[rng.gen_range(0..Selector::FUZZING.len())];
                selector.select(ty, rng).into_arg()
            }))
        });
        // Recursive grammars may never terminate; the capped walk is still a
        // useful input.
        walk.unwrap_or_else(|(partial, _)| partial)
    }

    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<ArgList> {
        (0..count).map(|_| self.next_input(rng)).collect()
    }
}
