//! Parameter model for target arguments.
//!
//! A [`Parameter`] describes one argument slot. It is either a single typed
//! value (`42`, `hello`) or a *formatted* template such as
//! `--port=<<INT>>` whose placeholders are substituted in order when the
//! argument is rendered.
//!
//! Templates accept both the short placeholder spelling (`<<INT>>`,
//! `<<STRING>>`) and the legacy one (`<<REPLACE_ME_INT>>`,
//! `<<REPLACE_ME_STRING>>`).

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<<(?:REPLACE_ME_)?(STRING|INT)>>").expect("placeholder regex should compile")
});

/// The declared type of a single value.
///
/// Numeric variants carry optional inclusive bounds taken from the bounds
/// record. Bounds never take part in type identity, see [`Self::kind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterType {
    Integer { min: Option<i32>, max: Option<i32> },
    Double { min: Option<f64>, max: Option<f64> },
    String,
}

/// Bound-free type tag used for dispatch and type-identity comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Integer,
    Double,
    String,
}

impl TypeKind {
    pub const ALL: [Self; 3] = [Self::Integer, Self::Double, Self::String];

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Double)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
        }
    }
}

impl ParameterType {
    /// An unbounded integer.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer {
            min: None,
            max: None,
        }
    }

    /// An unbounded double.
    #[must_use]
    pub const fn double() -> Self {
        Self::Double {
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Integer { .. } => TypeKind::Integer,
            Self::Double { .. } => TypeKind::Double,
            Self::String => TypeKind::String,
        }
    }
}

/// Error returned when a parameter is rendered with the wrong number of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    ArityMismatch { expected: usize, found: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch { expected, found } => write!(
                f,
                "wrong number of values: parameter takes {expected}, got {found}"
            ),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Plain(ParameterType),
    Formatted {
        template: String,
        types: Vec<ParameterType>,
    },
}

/// One argument slot of a target's command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    shape: Shape,
    optional: bool,
}

impl Parameter {
    /// A parameter holding a single value of `ty`.
    #[must_use]
    pub const fn typed(ty: ParameterType, optional: bool) -> Self {
        Self {
            shape: Shape::Plain(ty),
            optional,
        }
    }

    /// A parameter rendered from `template`, with one value per placeholder.
    ///
    /// A template without placeholders is a literal (for example a flag such
    /// as `--verbose`) and renders from an empty value list.
    #[must_use]
    pub fn formatted(template: impl Into<String>, optional: bool) -> Self {
        let template = template.into();
        let types = scan_placeholders(&template);
        Self {
            shape: Shape::Formatted { template, types },
            optional,
        }
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub const fn is_formatted(&self) -> bool {
        matches!(self.shape, Shape::Formatted { .. })
    }

    /// The template string, if this is a formatted parameter.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        match &self.shape {
            Shape::Formatted { template, .. } => Some(template),
            Shape::Plain(_) => None,
        }
    }

    /// Types of the values needed to render this parameter, in order.
    #[must_use]
    pub fn types(&self) -> &[ParameterType] {
        match &self.shape {
            Shape::Plain(ty) => std::slice::from_ref(ty),
            Shape::Formatted { types, .. } => types,
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.types().len()
    }

    /// True if any value slot is numeric.
    #[must_use]
    pub fn has_numeric_slot(&self) -> bool {
        self.types().iter().any(|ty| ty.kind().is_numeric())
    }

    /// Render the argument string from already-stringified values.
    ///
    /// Values are substituted verbatim; no escaping is applied.
    pub fn render<S: AsRef<str>>(&self, values: &[S]) -> Result<String, RenderError> {
        if values.len() != self.arity() {
            return Err(RenderError::ArityMismatch {
                expected: self.arity(),
                found: values.len(),
            });
        }

        Ok(self.splice(values))
    }

    /// Render by asking `pick` for one value per slot, in order.
    pub fn fill_with<F>(&self, mut pick: F) -> String
    where
        F: FnMut(&ParameterType) -> String,
    {
        let values: Vec<String> = self.types().iter().map(&mut pick).collect();
        self.splice(&values)
    }

    fn splice<S: AsRef<str>>(&self, values: &[S]) -> String {
        match &self.shape {
            Shape::Plain(_) => values
                .first()
                .map(|v| v.as_ref().to_string())
                .unwrap_or_default(),
            Shape::Formatted { template, .. } => {
                let mut out = String::with_capacity(template.len());
                let mut last = 0;
                for (m, value) in PLACEHOLDER.find_iter(template).zip(values) {
                    out.push_str(&template[last..m.start()]);
                    out.push_str(value.as_ref());
                    last = m.end();
                }
                out.push_str(&template[last..]);
                out
            }
        }
    }
}

fn scan_placeholders(template: &str) -> Vec<ParameterType> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| match &caps[1] {
            "INT" => ParameterType::integer(),
            _ => ParameterType::String,
        })
        .collect()
}
