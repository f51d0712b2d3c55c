//! Bounds records: the target's argument grammar plus its golden tests.
//!
//! A bounds record is JSON or YAML (picked by file extension) holding exactly
//! one parameter-space key and a list of tests.
//!
//! # Example
//!
//! ```yaml
//! fixed parameter list:
//!   - type: java.lang.Integer
//!     min: 0
//!     max: 100
//!   - type: string
//!     optional: true
//!
//! tests:
//!   - parameters: ["5", "hello"]
//!     standardOutputRegex: "^ok$"
//!     standardErrorRegex: "^$"
//! ```
//!
//! Dependent grammars use `dependent parameters` instead: a map from a regex
//! over the space-joined prefix to one descriptor or a list of them.
//!
//! ```yaml
//! dependent parameters:
//!   "":
//!     enumerated values: ["add", "sub", "--help"]
//!   "add|sub":
//!     format: "<<INT>>"
//!   "(add|sub) -?\\d+":
//!     format: "<<INT>>"
//! ```
//!
//! Descriptor keys: `type`, `min`, `max`, `optional`, `format` and
//! `enumerated values`. An enumerated descriptor expands into one formatted
//! parameter per value (in a fixed list, the alternatives of one position);
//! a `format` descriptor becomes one formatted
//! parameter; anything else is a plain typed parameter.

use crate::classify::{Expectation, GoldenTest};
use crate::parameter::{Parameter, ParameterType};
use crate::space::{DependentEntry, ParameterSpace};
use regex::Regex;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Anything in a template that looks like a placeholder.
static PLACEHOLDER_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<[A-Za-z_]*>>").expect("placeholder-like regex should compile"));

/// Placeholders the renderer understands.
const KNOWN_PLACEHOLDERS: [&str; 4] = [
    "<<INT>>",
    "<<STRING>>",
    "<<REPLACE_ME_INT>>",
    "<<REPLACE_ME_STRING>>",
];

/// Serialization format of a bounds record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsFormat {
    Json,
    Yaml,
}

impl BoundsFormat {
    /// `.yaml`/`.yml` are YAML; `.json` or no extension is JSON.
    pub fn from_path(path: &Path) -> Result<Self, BoundsError> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            None | Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some(_) => Err(BoundsError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Errors raised while turning a bounds record into a grammar.
#[derive(Debug)]
pub enum BoundsError {
    /// IO error reading the file.
    Io(io::Error),

    Json(serde_json::Error),

    Yaml(serde_yaml::Error),

    /// Neither `fixed parameter list` nor `dependent parameters` is present.
    MissingParameterSpace,

    /// Both parameter-space keys are present.
    AmbiguousParameterSpace,

    /// A plain descriptor has no `type`.
    MissingType { context: String },

    UnknownType { type_name: String },

    InvalidBound {
        field: &'static str,
        value: String,
        reason: String,
    },

    InvalidTemplate { template: String, reason: String },

    InvalidDependencyKey { key: String, error: String },

    /// A golden test's expected-output regex does not compile.
    InvalidExpectation {
        index: usize,
        stream: &'static str,
        pattern: String,
        error: String,
    },

    UnsupportedFormat { path: PathBuf },
}

impl fmt::Display for BoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Yaml(e) => write!(f, "YAML parse error: {e}"),
            Self::MissingParameterSpace => write!(
                f,
                "bounds record has neither 'fixed parameter list' nor 'dependent parameters'"
            ),
            Self::AmbiguousParameterSpace => write!(
                f,
                "bounds record has both 'fixed parameter list' and 'dependent parameters'"
            ),
            Self::MissingType { context } => {
                write!(f, "parameter {context} has no type, format or enumerated values")
            }
            Self::UnknownType { type_name } => write!(f, "unknown parameter type '{type_name}'"),
            Self::InvalidBound {
                field,
                value,
                reason,
            } => write!(f, "invalid {field} bound {value}: {reason}"),
            Self::InvalidTemplate { template, reason } => {
                write!(f, "invalid template '{template}': {reason}")
            }
            Self::InvalidDependencyKey { key, error } => {
                write!(f, "invalid dependency key '{key}': {error}")
            }
            Self::InvalidExpectation {
                index,
                stream,
                pattern,
                error,
            } => write!(
                f,
                "test #{index}: invalid {stream} regex '{pattern}': {error}"
            ),
            Self::UnsupportedFormat { path } => write!(
                f,
                "unsupported bounds file '{}': expected .json, .yaml or .yml",
                path.display()
            ),
        }
    }
}

impl std::error::Error for BoundsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BoundsError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for BoundsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<serde_yaml::Error> for BoundsError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}

/// A parsed and validated bounds record.
#[derive(Debug, Clone)]
pub struct Bounds {
    pub space: ParameterSpace,
    pub tests: Vec<GoldenTest>,
}

impl Bounds {
    /// The golden argument lists, used as the corrupted-input corpus.
    #[must_use]
    pub fn corpus(&self) -> Vec<Vec<String>> {
        self.tests.iter().map(|t| t.args.clone()).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawBounds {
    #[serde(rename = "fixed parameter list", default)]
    fixed: Option<Vec<RawDescriptor>>,

    #[serde(rename = "dependent parameters", default)]
    dependent: Option<OrderedEntries<OneOrMany<RawDescriptor>>>,

    #[serde(default)]
    tests: Vec<RawTest>,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(rename = "type", default)]
    type_name: Option<String>,

    #[serde(default)]
    min: Option<f64>,

    #[serde(default)]
    max: Option<f64>,

    #[serde(default)]
    optional: bool,

    #[serde(default)]
    format: Option<String>,

    #[serde(rename = "enumerated values", default)]
    enumerated: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawTest {
    #[serde(default)]
    parameters: Vec<Scalar>,

    #[serde(rename = "standardOutputRegex", alias = "stdout")]
    stdout: String,

    #[serde(rename = "standardErrorRegex", alias = "stderr")]
    stderr: String,
}

/// Test arguments may be written as bare YAML/JSON scalars.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_arg(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// A map decoded into a list of entries in document order.
#[derive(Debug)]
struct OrderedEntries<T>(Vec<(String, T)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = OrderedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from dependency keys to parameter descriptors")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Read and validate a bounds file.
pub fn parse_bounds_file(path: &Path) -> Result<Bounds, BoundsError> {
    let format = BoundsFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_bounds_str(&content, format)
}

/// Parse and validate a bounds record from text.
pub fn parse_bounds_str(content: &str, format: BoundsFormat) -> Result<Bounds, BoundsError> {
    let raw: RawBounds = match format {
        BoundsFormat::Json => serde_json::from_str(content)?,
        BoundsFormat::Yaml => serde_yaml::from_str(content)?,
    };

    let space = match (raw.fixed, raw.dependent) {
        (Some(_), Some(_)) => return Err(BoundsError::AmbiguousParameterSpace),
        (None, None) => return Err(BoundsError::MissingParameterSpace),
        (Some(list), None) => {
            // One position per descriptor; enumerated values are alternatives
            // for that position.
            let mut positions = Vec::with_capacity(list.len());
            for (i, descriptor) in list.into_iter().enumerate() {
                positions.push(build_parameters(descriptor, &format!("#{i}"))?);
            }
            tracing::debug!(positions = positions.len(), "parsed fixed parameter list");
            ParameterSpace::Fixed(positions)
        }
        (None, Some(OrderedEntries(map))) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, descriptors) in map {
                let mut params = Vec::new();
                for descriptor in descriptors.into_vec() {
                    params.extend(build_parameters(descriptor, &format!("under key '{key}'"))?);
                }
                let entry = DependentEntry::new(key.clone(), params).map_err(|e| {
                    BoundsError::InvalidDependencyKey {
                        key,
                        error: e.to_string(),
                    }
                })?;
                entries.push(entry);
            }
            tracing::debug!(keys = entries.len(), "parsed dependent parameters");
            ParameterSpace::Dependent(entries)
        }
    };

    let mut tests = Vec::with_capacity(raw.tests.len());
    for (index, test) in raw.tests.into_iter().enumerate() {
        tests.push(build_test(index, test)?);
    }

    Ok(Bounds { space, tests })
}

fn build_test(index: usize, raw: RawTest) -> Result<GoldenTest, BoundsError> {
    let invalid = |stream, pattern: &str, e: fancy_regex::Error| BoundsError::InvalidExpectation {
        index,
        stream,
        pattern: pattern.to_string(),
        error: e.to_string(),
    };
    let stdout =
        Expectation::new(raw.stdout.as_str()).map_err(|e| invalid("stdout", &raw.stdout, e))?;
    let stderr =
        Expectation::new(raw.stderr.as_str()).map_err(|e| invalid("stderr", &raw.stderr, e))?;

    Ok(GoldenTest {
        args: raw.parameters.into_iter().map(Scalar::into_arg).collect(),
        stdout,
        stderr,
    })
}

fn build_parameters(raw: RawDescriptor, context: &str) -> Result<Vec<Parameter>, BoundsError> {
    let ty = raw.type_name.as_deref().map(parse_type).transpose()?;

    if let Some(values) = raw.enumerated {
        if values.is_empty() {
            return Err(BoundsError::InvalidTemplate {
                template: String::new(),
                reason: format!("enumerated values of parameter {context} are empty"),
            });
        }
        return values
            .into_iter()
            .map(|value| {
                check_template(&value)?;
                Ok(Parameter::formatted(value, raw.optional))
            })
            .collect();
    }

    if let Some(template) = raw.format {
        check_template(&template)?;
        return Ok(vec![Parameter::formatted(template, raw.optional)]);
    }

    let ty = ty.ok_or_else(|| BoundsError::MissingType {
        context: context.to_string(),
    })?;
    let ty = apply_bounds(ty, raw.min, raw.max)?;
    Ok(vec![Parameter::typed(ty, raw.optional)])
}

fn parse_type(name: &str) -> Result<ParameterType, BoundsError> {
    let lower = name.trim().to_ascii_lowercase();
    let short = lower.strip_prefix("java.lang.").unwrap_or(&lower);
    match short {
        "integer" | "int" => Ok(ParameterType::integer()),
        "double" | "float" => Ok(ParameterType::double()),
        "string" | "str" => Ok(ParameterType::String),
        _ => Err(BoundsError::UnknownType {
            type_name: name.to_string(),
        }),
    }
}

fn apply_bounds(
    ty: ParameterType,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<ParameterType, BoundsError> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(BoundsError::InvalidBound {
                field: "min",
                value: lo.to_string(),
                reason: format!("greater than max {hi}"),
            });
        }
    }

    match ty {
        ParameterType::Integer { .. } => Ok(ParameterType::Integer {
            min: min.map(|v| integer_bound("min", v)).transpose()?,
            max: max.map(|v| integer_bound("max", v)).transpose()?,
        }),
        ParameterType::Double { .. } => Ok(ParameterType::Double { min, max }),
        ParameterType::String => match min.map(|v| ("min", v)).or(max.map(|v| ("max", v))) {
            Some((field, value)) => Err(BoundsError::InvalidBound {
                field,
                value: value.to_string(),
                reason: "string parameters take no bounds".to_string(),
            }),
            None => Ok(ParameterType::String),
        },
    }
}

fn integer_bound(field: &'static str, value: f64) -> Result<i32, BoundsError> {
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(BoundsError::InvalidBound {
            field,
            value: value.to_string(),
            reason: "not a 32-bit integer".to_string(),
        });
    }
    Ok(value as i32)
}

fn check_template(template: &str) -> Result<(), BoundsError> {
    for m in PLACEHOLDER_LIKE.find_iter(template) {
        if !KNOWN_PLACEHOLDERS.contains(&m.as_str()) {
            return Err(BoundsError::InvalidTemplate {
                template: template.to_string(),
                reason: format!("unknown placeholder {}", m.as_str()),
            });
        }
    }
    Ok(())
}
