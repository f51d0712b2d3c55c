//! Parameter spaces: "what can come next, given what was chosen so far".
//!
//! Targets accept either a fixed positional list of arguments or a tree of
//! argument modes, where later arguments depend on earlier choices. Both are
//! modelled by [`ParameterSpace::next`], a pure function of the prefix of
//! argument strings accumulated so far. Generators build an argument list by
//! querying it repeatedly with a growing prefix until it offers nothing.

use crate::parameter::Parameter;
use fancy_regex::Regex;
use std::fmt;

/// A dependency-keyed entry: `pattern` is matched against the space-joined
/// prefix and, on a full match, `parameters` become available.
#[derive(Debug, Clone)]
pub struct DependentEntry {
    key: String,
    pattern: Regex,
    parameters: Vec<Parameter>,
}

impl DependentEntry {
    /// Compile a key as a full-match pattern.
    pub fn new(key: impl Into<String>, parameters: Vec<Parameter>) -> Result<Self, fancy_regex::Error> {
        let key = key.into();
        let pattern = Regex::new(&format!("^(?:{key})$"))?;
        Ok(Self {
            key,
            pattern,
            parameters,
        })
    }

    /// The raw key as written in the bounds record.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The empty key is reserved for the first argument and only matches an
    /// empty prefix, never a prefix that merely joins to "".
    fn matches(&self, prefix: &[String], joined: &str) -> bool {
        if self.key.is_empty() {
            return prefix.is_empty();
        }
        match self.pattern.is_match(joined) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::debug!(key = %self.key, error = %e, "dependency key failed to evaluate");
                false
            }
        }
    }
}

/// The grammar of legal argument sequences for one target.
#[derive(Debug, Clone)]
pub enum ParameterSpace {
    /// Position `i` must satisfy one of the alternatives listed at `i`.
    Fixed(Vec<Vec<Parameter>>),
    /// Entries in declaration order.
    Dependent(Vec<DependentEntry>),
}

/// Failure to reach a terminal state while walking a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    DepthExceeded { depth: usize },
}

impl fmt::Display for TraversalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthExceeded { depth } => write!(
                f,
                "parameter space still offered candidates after {depth} arguments"
            ),
        }
    }
}

impl std::error::Error for TraversalError {}

impl ParameterSpace {
    /// Fixed spaces have a finite arity; dependent ones do not.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// A fixed space with a single candidate at every position.
    #[must_use]
    pub fn fixed(params: impl IntoIterator<Item = Parameter>) -> Self {
        Self::Fixed(params.into_iter().map(|param| vec![param]).collect())
    }

    /// Candidates for the next argument after `prefix`.
    ///
    /// Recomputed from scratch on every call.
    #[must_use]
    pub fn next(&self, prefix: &[String]) -> Vec<&Parameter> {
        match self {
            Self::Fixed(positions) => positions
                .get(prefix.len())
                .map(|alternatives| alternatives.iter().collect())
                .unwrap_or_default(),
            Self::Dependent(entries) => {
                let joined = prefix.join(" ");
                entries
                    .iter()
                    .filter(|entry| entry.matches(prefix, &joined))
                    .flat_map(|entry| entry.parameters.iter())
                    .collect()
            }
        }
    }

    /// Number of positions (fixed) or dependency keys (dependent).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Fixed(positions) => positions.len(),
            Self::Dependent(entries) => entries.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Choice made by a traversal policy at one step.
pub enum Step {
    /// Append this rendered argument and continue.
    Append(String),
    /// Stop here; the prefix so far is the argument list.
    Stop,
}

/// Walk `space` from an empty prefix, asking `choose` for each step.
///
/// Ends when the space offers no candidates, when `choose` stops, or when
/// `max_depth` arguments have been produced. Hitting the depth cap is
/// reported as an error together with the partial list.
pub fn traverse<F>(
    space: &ParameterSpace,
    max_depth: usize,
    mut choose: F,
) -> Result<Vec<String>, (Vec<String>, TraversalError)>
where
    F: FnMut(&[&Parameter], &[String]) -> Step,
{
    let mut prefix: Vec<String> = Vec::new();
    loop {
        let candidates = space.next(&prefix);
        if candidates.is_empty() {
            return Ok(prefix);
        }
        if prefix.len() >= max_depth {
            return Err((prefix, TraversalError::DepthExceeded { depth: max_depth }));
        }
        match choose(&candidates, &prefix) {
            Step::Append(arg) => prefix.push(arg),
            Step::Stop => return Ok(prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterType;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(ToString::to_string).collect()
    }

    fn dependent() -> ParameterSpace {
        ParameterSpace::Dependent(vec![
            DependentEntry::new(
                "",
                vec![
                    Parameter::formatted("--shuffle", false),
                    Parameter::formatted("--range", false),
                ],
            )
            .unwrap(),
            DependentEntry::new(
                "--range",
                vec![Parameter::formatted("start=<<INT>>", false)],
            )
            .unwrap(),
            DependentEntry::new(
                r"--range start=-?\d+",
                vec![Parameter::formatted("step=<<INT>>", true)],
            )
            .unwrap(),
        ])
    }

    #[test]
    fn fixed_offers_one_candidate_per_position() {
        let space = ParameterSpace::fixed([
            Parameter::typed(ParameterType::integer(), false),
            Parameter::typed(ParameterType::String, false),
        ]);
        assert!(space.is_bounded());
        assert_eq!(space.len(), 2);
        assert_eq!(space.next(&[]).len(), 1);
        assert_eq!(
            space.next(&s(&["1"]))[0].types()[0],
            ParameterType::String
        );
        assert!(space.next(&s(&["1", "x"])).is_empty());
        assert!(space.next(&s(&["1", "x", "extra"])).is_empty());
    }

    #[test]
    fn fixed_position_offers_all_alternatives() {
        let space = ParameterSpace::Fixed(vec![
            vec![
                Parameter::formatted("add", false),
                Parameter::formatted("sub", false),
            ],
            vec![Parameter::typed(ParameterType::integer(), false)],
        ]);
        assert_eq!(space.len(), 2);
        let first: Vec<_> = space.next(&[]).iter().map(|p| p.template()).collect();
        assert_eq!(first, vec![Some("add"), Some("sub")]);
        assert_eq!(space.next(&s(&["sub"])).len(), 1);
        assert!(space.next(&s(&["sub", "1"])).is_empty());
    }

    #[test]
    fn dependent_empty_prefix_hits_first_argument_entry() {
        let space = dependent();
        assert!(!space.is_bounded());
        let first = space.next(&[]);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].template(), Some("--shuffle"));
    }

    #[test]
    fn dependent_keys_are_full_matches() {
        let space = dependent();
        let after_range = space.next(&s(&["--range"]));
        assert_eq!(after_range.len(), 1);
        assert_eq!(after_range[0].template(), Some("start=<<INT>>"));

        // "--range" must not match as a substring of a longer prefix
        let after_start = space.next(&s(&["--range", "start=4"]));
        assert_eq!(after_start.len(), 1);
        assert_eq!(after_start[0].template(), Some("step=<<INT>>"));

        assert!(space.next(&s(&["--shuffle"])).is_empty());
    }

    #[test]
    fn empty_key_does_not_match_prefix_of_empty_strings() {
        let space = dependent();
        assert!(space.next(&s(&[""])).is_empty());
    }

    #[test]
    fn keys_matching_empty_string_apply_to_empty_prefix() {
        let space = ParameterSpace::Dependent(vec![
            DependentEntry::new(".*", vec![Parameter::formatted("any", true)]).unwrap(),
            DependentEntry::new("x+", vec![Parameter::formatted("never", true)]).unwrap(),
        ]);
        let first = space.next(&[]);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].template(), Some("any"));
    }

    #[test]
    fn traverse_reports_depth_cap() {
        let space = ParameterSpace::Dependent(vec![
            DependentEntry::new(".*", vec![Parameter::formatted("again", false)]).unwrap(),
        ]);
        let err = traverse(&space, 4, |_, _| Step::Append("again".into())).unwrap_err();
        assert_eq!(err.0.len(), 4);
        assert_eq!(err.1, TraversalError::DepthExceeded { depth: 4 });
    }

    #[test]
    fn traverse_stops_on_request() {
        let space = dependent();
        let args = traverse(&space, 16, |_, _| Step::Stop).unwrap();
        assert!(args.is_empty());
    }
}
