//! Concrete values chosen for parameter slots.

use crate::parameter::TypeKind;
use std::fmt;

/// A value whose runtime shape matches one of the parameter types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Double(f64),
    Str(String),
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Int(_) => TypeKind::Integer,
            Self::Double(_) => TypeKind::Double,
            Self::Str(_) => TypeKind::String,
        }
    }

    /// The argv form of this value.
    #[must_use]
    pub fn into_arg(self) -> String {
        match self {
            Self::Str(s) => s,
            other => other.to_string(),
        }
    }
}

/// Doubles render the way JVM-style parsers spell them (`NaN`, `Infinity`,
/// `-0.0`, `4.9E-324`-like exponents), since that is what targets expect.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Double(v) => fmt_double(*v, f),
            Self::Str(s) => f.write_str(s),
        }
    }
}

fn fmt_double(v: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        let abs = v.abs();
        if abs != 0.0 && !(1e-3..1e7).contains(&abs) {
            write!(f, "{}", format!("{v:e}").replace('e', "E"))
        } else {
            // Debug keeps the trailing ".0" and the sign of -0.0
            write!(f, "{v:?}")
        }
    }
}
