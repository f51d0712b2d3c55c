//! Splitting an iteration budget across generators.

use super::{
    ArgList, ArgumentCountGenerator, CorruptedInputGenerator, RandomParameterGenerator,
    default_arguments, overflow_probes,
};
use crate::space::ParameterSpace;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Which generator produced an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Default,
    Overflow,
    ArgumentCount,
    CorruptedInput,
    RandomParameter,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Overflow => write!(f, "overflow"),
            Self::ArgumentCount => write!(f, "argument_count"),
            Self::CorruptedInput => write!(f, "corrupted_input"),
            Self::RandomParameter => write!(f, "random_parameter"),
        }
    }
}

/// Inputs in submission order, each tagged with its generator.
#[derive(Debug, Clone, Default)]
pub struct GeneratedBatch {
    pub inputs: Vec<ArgList>,
    pub origins: Vec<Origin>,
}

impl GeneratedBatch {
    fn extend(&mut self, origin: Origin, inputs: Vec<ArgList>) {
        self.origins.extend(std::iter::repeat_n(origin, inputs.len()));
        self.inputs.extend(inputs);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// How many inputs each generator contributed, in generation order.
    #[must_use]
    pub fn counts(&self) -> Vec<(Origin, usize)> {
        let mut counts: Vec<(Origin, usize)> = Vec::new();
        for origin in &self.origins {
            match counts.last_mut() {
                Some((last, n)) if last == origin => *n += 1,
                _ => counts.push((*origin, 1)),
            }
        }
        counts
    }
}

/// Budget policy for one security batch.
///
/// Fixed-size probes (default, overflow, argument count) always run. A
/// `1 / corrupted_share` slice of what is left goes to corrupted inputs and
/// the rest to random walks, so the batch is at least `iterations` long.
#[derive(Debug, Clone, Copy)]
pub struct BatchPlan {
    pub iterations: usize,
    pub corrupted_share: usize,
    pub max_depth: usize,
    pub argument_count: ArgumentCountGenerator,
}

impl BatchPlan {
    pub fn build<R: Rng + ?Sized>(
        &self,
        space: &ParameterSpace,
        corpus: &[ArgList],
        rng: &mut R,
    ) -> GeneratedBatch {
        let mut batch = GeneratedBatch::default();

        match default_arguments(space, self.max_depth) {
            Ok(args) => batch.extend(Origin::Default, vec![args]),
            Err(e) => tracing::warn!(error = %e, "default traversal did not terminate"),
        }
        batch.extend(Origin::Overflow, overflow_probes(space));
        batch.extend(Origin::ArgumentCount, self.argument_count.generate(rng));

        let corrupted = CorruptedInputGenerator::new(corpus);
        let share = self.iterations.saturating_sub(batch.len()) / self.corrupted_share.max(1);
        batch.extend(Origin::CorruptedInput, corrupted.generate(share, rng));

        let random = RandomParameterGenerator::new(space, self.max_depth);
        let rest = self.iterations.saturating_sub(batch.len());
        batch.extend(Origin::RandomParameter, random.generate(rest, rng));

        for (origin, count) in batch.counts() {
            tracing::info!(generator = %origin, count, "generated security inputs");
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{Parameter, ParameterType};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn plan(iterations: usize) -> BatchPlan {
        BatchPlan {
            iterations,
            corrupted_share: 3,
            max_depth: 64,
            argument_count: ArgumentCountGenerator::new(2, 10),
        }
    }

    fn space() -> ParameterSpace {
        ParameterSpace::fixed([
            Parameter::typed(ParameterType::integer(), false),
            Parameter::typed(ParameterType::integer(), false),
        ])
    }

    #[test]
    fn fills_budget_in_generator_order() {
        let corpus = vec![vec!["5".to_string(), "3".to_string()]];
        let batch = plan(100).build(&space(), &corpus, &mut StdRng::seed_from_u64(1));
        assert_eq!(batch.len(), 100);
        assert_eq!(batch.origins.len(), batch.inputs.len());
        // 1 default + 3 overflow + 5 argument count = 9 fixed; (100 - 9) / 3 = 30
        assert_eq!(
            batch.counts(),
            vec![
                (Origin::Default, 1),
                (Origin::Overflow, 3),
                (Origin::ArgumentCount, 5),
                (Origin::CorruptedInput, 30),
                (Origin::RandomParameter, 61),
            ]
        );
    }

    #[test]
    fn without_corpus_random_walks_take_the_rest() {
        let batch = plan(50).build(&space(), &[], &mut StdRng::seed_from_u64(2));
        assert_eq!(batch.len(), 50);
        assert!(!batch.origins.contains(&Origin::CorruptedInput));
    }

    #[test]
    fn tiny_budget_still_runs_fixed_probes() {
        let batch = plan(3).build(&space(), &[], &mut StdRng::seed_from_u64(3));
        assert_eq!(batch.len(), 9);
    }
}
