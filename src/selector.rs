//! Value selectors.
//!
//! A [`Selector`] turns a declared [`ParameterType`] into a concrete
//! [`Value`]. All randomness comes from the `rng` argument, so a seeded
//! generator reproduces the same values.

use crate::boundary;
use crate::parameter::{ParameterType, TypeKind};
use crate::value::Value;
use rand::Rng;

/// Longest string produced by [`Selector::Random`].
pub const MAX_RANDOM_STRING_LEN: usize = 32;

/// Strategy for picking a value for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// A value from the boundary catalog of the requested type.
    Boundary,
    /// A boundary value of a different, randomly chosen type.
    MismatchedType,
    /// A value drawn from the full domain of the requested type.
    Random,
    /// Fixed well-formed value: 1, 1.0 or "one".
    Placeholder,
}

impl Selector {
    /// The selectors the random-parameter generator chooses between.
    pub const FUZZING: [Self; 3] = [Self::Boundary, Self::MismatchedType, Self::Random];

    pub fn select<R: Rng + ?Sized>(self, ty: &ParameterType, rng: &mut R) -> Value {
        match self {
            Self::Boundary => boundary::pick(ty.kind(), rng),
            Self::MismatchedType => {
                let others: Vec<TypeKind> = TypeKind::ALL
                    .into_iter()
                    .filter(|kind| *kind != ty.kind())
                    .collect();
                let kind = others[rng.gen_range(0..others.len())];
                boundary::pick(kind, rng)
            }
            Self::Random => random_value(ty, rng),
            Self::Placeholder => placeholder(ty),
        }
    }
}

/// The fixed well-formed value for a slot.
#[must_use]
pub fn placeholder(ty: &ParameterType) -> Value {
    match ty.kind() {
        TypeKind::Integer => Value::Int(1),
        TypeKind::Double => Value::Double(1.0),
        TypeKind::String => Value::Str("one".to_string()),
    }
}

/// Draws ignore declared bounds; the whole domain of the type is fair game.
fn random_value<R: Rng + ?Sized>(ty: &ParameterType, rng: &mut R) -> Value {
    match ty.kind() {
        TypeKind::Integer => Value::Int(rng.r#gen()),
        TypeKind::Double => Value::Double(random_double(rng)),
        TypeKind::String => {
            let len = rng.gen_range(0..MAX_RANDOM_STRING_LEN);
            if rng.gen_bool(0.5) {
                Value::Str(well_formed_string(len, rng))
            } else {
                Value::Str(malformed_string(len, rng))
            }
        }
    }
}

/// A finite double with a uniformly chosen decimal exponent and sign.
pub fn random_double<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let exponent = rng.gen_range(-307..=307);
    let magnitude = rng.r#gen::<f64>() * 10f64.powi(exponent);
    if rng.r#gen() { -magnitude } else { magnitude }
}

/// A printable character in `0x20..0x120`.
pub fn random_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from_u32(rng.gen_range(0x20..0x120)).unwrap_or(' ')
}

/// A string of reasonably well-formed printable characters.
pub fn well_formed_string<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len).map(|_| random_char(rng)).collect()
}

/// A string of arbitrary code points from `1..0x20000`.
///
/// Surrogate code points have no `char` form; they come out as U+FFFD.
pub fn malformed_string<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| char::from_u32(rng.gen_range(1..0x20000)).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
