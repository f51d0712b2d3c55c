//! Test generators.
//!
//! Each generator turns a [`ParameterSpace`](crate::space::ParameterSpace)
//! (and, for corrupted inputs, a corpus of golden argument lists) into
//! candidate argument lists for the runner. Generators run synchronously
//! before a batch is submitted, so they share one `&mut` random source and
//! never race with execution.
//!
//! | Generator | Output |
//! |-----------|--------|
//! | [`default`] | one happy-path list, first candidate everywhere |
//! | [`overflow`] | generic strings, huge and hugely negative numbers per position |
//! | [`argument_count`] | empty list plus random-length lists ignoring the grammar |
//! | [`random_params`] | random walks of the grammar with mixed selectors |
//! | [`corrupted`] | character-level mutations of golden lists |
//! | [`plan`] | splits an iteration budget across the above |

pub mod argument_count;
pub mod corrupted;
pub mod default;
pub mod overflow;
pub mod plan;
pub mod random_params;

pub use argument_count::ArgumentCountGenerator;
pub use corrupted::CorruptedInputGenerator;
pub use default::default_arguments;
pub use overflow::overflow_probes;
pub use plan::{BatchPlan, GeneratedBatch, Origin};
pub use random_params::RandomParameterGenerator;

/// One candidate command line, excluding the target's own prefix.
pub type ArgList = Vec<String>;
