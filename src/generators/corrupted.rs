//! Corrupted-input generator.
//!
//! Takes known-good argument lists from the golden tests and damages them a
//! little: maybe an extra boundary string, maybe a dropped argument, and
//! up to half an argument's length in character edits.

use super::ArgList;
use crate::boundary;
use crate::selector::random_char;
use rand::Rng;
use rand::seq::SliceRandom;

/// Odds (one in N) of inserting or deleting a whole argument.
const STRUCTURAL_ODDS: u32 = 8;

#[derive(Debug, Clone, Copy)]
pub struct CorruptedInputGenerator<'a> {
    corpus: &'a [ArgList],
}

#[derive(Debug, Clone, Copy)]
enum Edit {
    Update,
    Delete,
    Insert,
}

impl<'a> CorruptedInputGenerator<'a> {
    #[must_use]
    pub const fn new(corpus: &'a [ArgList]) -> Self {
        Self { corpus }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// A mutated copy of a random golden list, or `None` for an empty corpus.
    pub fn next_input<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ArgList> {
        let golden = self.corpus.choose(rng)?;
        Some(corrupt(golden, rng))
    }

    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<ArgList> {
        (0..count).filter_map(|_| self.next_input(rng)).collect()
    }
}

/// Corrupt one argument list.
///
/// A list with nothing but empty arguments has nothing to corrupt and is
/// returned unchanged.
pub fn corrupt<R: Rng + ?Sized>(golden: &[String], rng: &mut R) -> ArgList {
    let mut args = golden.to_vec();
    if args.iter().all(String::is_empty) {
        return args;
    }

    if rng.gen_ratio(1, STRUCTURAL_ODDS) {
        let at = rng.gen_range(0..=args.len());
        args.insert(at, boundary::pick_string(rng).to_string());
    }

    if rng.gen_ratio(1, STRUCTURAL_ODDS) && args.len() > 1 {
        let at = rng.gen_range(0..args.len());
        args.remove(at);
    }

    let target = rng.gen_range(0..args.len());
    let mut chars: Vec<char> = args[target].chars().collect();
    if chars.is_empty() {
        return args;
    }

    // Up to half the argument's length; one-character arguments get no edits.
    let half = chars.len() / 2;
    let budget = if half == 0 { 0 } else { rng.gen_range(1..=half) };
    for _ in 0..budget {
        let edit = if chars.is_empty() {
            Edit::Insert
        } else {
            *[Edit::Update, Edit::Delete, Edit::Insert]
                .choose(rng)
                .unwrap_or(&Edit::Insert)
        };
        match edit {
            Edit::Update => {
                let at = rng.gen_range(0..chars.len());
                chars[at] = random_char(rng);
            }
            Edit::Delete => {
                let at = rng.gen_range(0..chars.len());
                chars.remove(at);
            }
            Edit::Insert => {
                let at = rng.gen_range(0..=chars.len());
                chars.insert(at, random_char(rng));
            }
        }
    }

    args[target] = chars.into_iter().collect();
    args
}
