//! Boundary-value catalogs.
//!
//! Edge-of-domain values per type. Selection is uniform over each catalog and
//! driven entirely by the caller's random source.

use crate::parameter::TypeKind;
use crate::value::Value;
use rand::Rng;
use rand::seq::SliceRandom;

pub const INTS: [i32; 13] = [
    0,
    1,
    2,
    3,
    7,
    -1,
    -2,
    i32::MAX,
    i32::MAX - 1,
    i32::MAX >> 1,
    i32::MIN,
    i32::MIN + 1,
    i32::MIN >> 1,
];

/// Includes the smallest subnormal and the smallest normal value.
pub const DOUBLES: [f64; 8] = [
    0.0,
    -0.0,
    f64::NAN,
    f64::INFINITY,
    f64::NEG_INFINITY,
    f64::from_bits(1),
    f64::MIN_POSITIVE,
    f64::MAX,
];

/// Control, invisible, encoded-NUL and shell-meaningful strings.
///
/// No entry contains a literal NUL, which cannot travel through argv.
pub const STRINGS: [&str; 14] = [
    "",
    "testing 123",
    "rich",
    "\u{1}",
    "\\x00",
    "\\u0000",
    "%00",
    "\u{feff}",
    "\u{200b}",
    "$(id)",
    "`id`",
    "; ls",
    "../../../../etc/passwd",
    "%s%s%s%n",
];

pub fn pick_int<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    *INTS.choose(rng).unwrap_or(&0)
}

pub fn pick_double<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    *DOUBLES.choose(rng).unwrap_or(&0.0)
}

pub fn pick_string<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    STRINGS.choose(rng).copied().unwrap_or("")
}

/// A boundary value of the given kind.
pub fn pick<R: Rng + ?Sized>(kind: TypeKind, rng: &mut R) -> Value {
    match kind {
        TypeKind::Integer => Value::Int(pick_int(rng)),
        TypeKind::Double => Value::Double(pick_double(rng)),
        TypeKind::String => Value::Str(pick_string(rng).to_string()),
    }
}
