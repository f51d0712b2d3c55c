//! Argument-count probes.
//!
//! These lists ignore the declared grammar entirely and only vary how many
//! arguments the target receives.

use super::ArgList;
use crate::boundary;
use crate::parameter::TypeKind;
use crate::selector::{MAX_RANDOM_STRING_LEN, malformed_string};
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy)]
pub struct ArgumentCountGenerator {
    /// Lists emitted per flavour (malformed strings, boundary values).
    probes: usize,
    /// Upper bound (inclusive) on the length of a random list.
    max_len: usize,
}

impl ArgumentCountGenerator {
    #[must_use]
    pub const fn new(probes: usize, max_len: usize) -> Self {
        Self { probes, max_len }
    }

    /// Number of lists [`Self::generate`] returns.
    #[must_use]
    pub const fn batch_len(&self) -> usize {
        1 + 2 * self.probes
    }

    /// The empty list, then `probes` lists of malformed strings, then
    /// `probes` lists of boundary values rendered as strings.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ArgList> {
        let mut out = Vec::with_capacity(self.batch_len());
        out.push(Vec::new());

        for _ in 0..self.probes {
            let len = rng.gen_range(0..=self.max_len);
            out.push(
                (0..len)
                    .map(|_| {
                        let chars = rng.gen_range(0..MAX_RANDOM_STRING_LEN);
                        malformed_string(chars, rng)
                    })
                    .collect(),
            );
        }

        for _ in 0..self.probes {
            let len = rng.gen_range(0..=self.max_len);
            out.push(
                (0..len)
                    .map(|_| {
                        let kind = *TypeKind::ALL.choose(rng).unwrap_or(&TypeKind::String);
                        boundary::pick(kind, rng).into_arg()
                    })
                    .collect(),
            );
        }

        out
    }
}

impl Default for ArgumentCountGenerator {
    fn default() -> Self {
        Self::new(5, 1000)
    }
}
