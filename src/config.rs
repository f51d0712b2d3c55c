//! Harness configuration.
//!
//! Values resolve in layers: built-in defaults, then a TOML file, then
//! `ARGPROBE_*` environment variables, then command-line flags (applied by
//! the binary).
//!
//! ```toml
//! threads = 8
//! iterations = 5000
//! time_goal_secs = 120
//! seed = 42
//! exception_markers = ["Exception in", "panicked at"]
//! ```

use crate::classify::DEFAULT_EXCEPTION_MARKER;
use crate::generators::{ArgumentCountGenerator, BatchPlan};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "ARGPROBE_CONFIG";

const CONFIG_DIR: &str = "argprobe";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Worker pool size.
    pub threads: usize,
    /// Security-test iteration budget.
    pub iterations: usize,
    /// Wall-clock budget for the security batch; 0 disables it.
    pub time_goal_secs: u64,
    /// Timeout for the golden batch; 0 disables it.
    pub basic_timeout_secs: u64,
    /// RNG seed; drawn from OS entropy when absent.
    pub seed: Option<u64>,
    /// Lists per flavour emitted by the argument-count generator.
    pub argument_count_probes: usize,
    /// Upper bound of random argument-list lengths.
    pub max_argument_count: usize,
    /// Divisor of the remaining budget given to corrupted-input tests.
    pub corrupted_share: usize,
    /// Cap on traversal steps for grammars that never terminate.
    pub max_traversal_depth: usize,
    /// stderr prefixes that mark an uncaught exception.
    pub exception_markers: Vec<String>,
    /// Child status polling interval.
    pub poll_interval_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            threads: 5,
            iterations: 1000,
            time_goal_secs: 300,
            basic_timeout_secs: 0,
            seed: None,
            argument_count_probes: 5,
            max_argument_count: 1000,
            corrupted_share: 3,
            max_traversal_depth: 256,
            exception_markers: vec![DEFAULT_EXCEPTION_MARKER.to_string()],
            poll_interval_ms: 10,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Toml { path: PathBuf, source: toml::de::Error },
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            Self::Toml { path, source } => {
                write!(f, "failed to parse config {}: {source}", path.display())
            }
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value '{value}' for {key}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Toml { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Command-line values; `None` keeps whatever the lower layers resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub threads: Option<usize>,
    pub iterations: Option<usize>,
    pub time_goal_secs: Option<u64>,
    pub basic_timeout_secs: Option<u64>,
    pub seed: Option<u64>,
}

impl HarnessConfig {
    /// Resolve every layer and validate the result once.
    pub fn resolve(explicit: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        Self::resolve_with_env(explicit, |key| std::env::var(key).ok(), overrides)
    }

    /// Same as [`Self::resolve`] with an injectable environment lookup.
    pub fn resolve_with_env<F>(
        explicit: Option<&Path>,
        env: F,
        overrides: Overrides,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_with_env(explicit, env)?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Resolve defaults, the config file and the environment, unvalidated.
    ///
    /// An explicit path (argument or `ARGPROBE_CONFIG`) must exist; the
    /// per-user file is only read when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(explicit, |key| std::env::var(key).ok())
    }

    /// Same as [`Self::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(explicit: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match user_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(env)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("ARGPROBE_THREADS") {
            self.threads = parse_env("ARGPROBE_THREADS", &v)?;
        }
        if let Some(v) = env("ARGPROBE_ITERATIONS") {
            self.iterations = parse_env("ARGPROBE_ITERATIONS", &v)?;
        }
        if let Some(v) = env("ARGPROBE_TIME_GOAL") {
            self.time_goal_secs = parse_env("ARGPROBE_TIME_GOAL", &v)?;
        }
        if let Some(v) = env("ARGPROBE_SEED") {
            self.seed = Some(parse_env("ARGPROBE_SEED", &v)?);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(threads) = overrides.threads {
            self.threads = threads;
        }
        if let Some(iterations) = overrides.iterations {
            self.iterations = iterations;
        }
        if let Some(secs) = overrides.time_goal_secs {
            self.time_goal_secs = secs;
        }
        if let Some(secs) = overrides.basic_timeout_secs {
            self.basic_timeout_secs = secs;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("threads", self.threads),
            ("corrupted_share", self.corrupted_share),
            ("max_traversal_depth", self.max_traversal_depth),
            ("max_argument_count", self.max_argument_count),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: value.to_string(),
                    reason: "must be at least 1",
                });
            }
        }
        if self.exception_markers.iter().any(String::is_empty) {
            return Err(ConfigError::InvalidValue {
                key: "exception_markers",
                value: String::new(),
                reason: "markers must not be empty",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn time_goal(&self) -> Option<Duration> {
        (self.time_goal_secs > 0).then(|| Duration::from_secs(self.time_goal_secs))
    }

    #[must_use]
    pub fn basic_timeout(&self) -> Option<Duration> {
        (self.basic_timeout_secs > 0).then(|| Duration::from_secs(self.basic_timeout_secs))
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn batch_plan(&self) -> BatchPlan {
        BatchPlan {
            iterations: self.iterations,
            corrupted_share: self.corrupted_share,
            max_depth: self.max_traversal_depth,
            argument_count: ArgumentCountGenerator::new(
                self.argument_count_probes,
                self.max_argument_count,
            ),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: "not a non-negative integer",
    })
}

/// `<config dir>/argprobe/config.toml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = HarnessConfig::default();
        assert_eq!(config.threads, 5);
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.time_goal(), Some(Duration::from_secs(300)));
        assert_eq!(config.basic_timeout(), None);
        assert_eq!(config.exception_markers, vec!["Exception in".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        let file = write_config("threads = 8\niterations = 50\nseed = 3\n");
        let config = HarnessConfig::load_with_env(
            Some(file.path()),
            env_of(&[("ARGPROBE_ITERATIONS", "70"), ("ARGPROBE_TIME_GOAL", "0")]),
        )
        .unwrap();
        assert_eq!(config.threads, 8);
        assert_eq!(config.iterations, 70);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.time_goal(), None);
        assert_eq!(config.corrupted_share, 3);
    }

    #[test]
    fn config_env_names_the_file() {
        let file = write_config("max_traversal_depth = 12\n");
        let path = file.path().to_string_lossy().into_owned();
        let config = HarnessConfig::load_with_env(None, env_of(&[(CONFIG_ENV, path.as_str())])).unwrap();
        assert_eq!(config.max_traversal_depth, 12);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = HarnessConfig::load_with_env(
            Some(Path::new("/nonexistent/argprobe.toml")),
            env_of(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("thread = 4\n");
        let err = HarnessConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn zero_threads_fail_validation() {
        let file = write_config("threads = 0\n");
        let err = HarnessConfig::resolve_with_env(Some(file.path()), env_of(&[]), Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "threads", .. }));
    }

    #[test]
    fn command_line_value_rescues_invalid_lower_layer() {
        let file = write_config("");
        let env = env_of(&[("ARGPROBE_THREADS", "0")]);
        let overrides = Overrides {
            threads: Some(4),
            ..Overrides::default()
        };
        let config = HarnessConfig::resolve_with_env(Some(file.path()), env, overrides).unwrap();
        assert_eq!(config.threads, 4);

        let err = HarnessConfig::resolve_with_env(
            Some(file.path()),
            env_of(&[("ARGPROBE_THREADS", "0")]),
            Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "threads", .. }));
    }

    #[test]
    fn overrides_only_replace_given_values() {
        let mut config = HarnessConfig {
            seed: Some(9),
            ..HarnessConfig::default()
        };
        config.apply_overrides(Overrides {
            iterations: Some(12),
            basic_timeout_secs: Some(3),
            ..Overrides::default()
        });
        assert_eq!(config.iterations, 12);
        assert_eq!(config.basic_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.threads, 5);
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let err = HarnessConfig::load_with_env(
            Some(write_config("").path()),
            env_of(&[("ARGPROBE_SEED", "abc")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("ARGPROBE_SEED"));
    }

    #[test]
    fn batch_plan_carries_generator_settings() {
        let config = HarnessConfig {
            iterations: 10,
            argument_count_probes: 2,
            ..HarnessConfig::default()
        };
        let plan = config.batch_plan();
        assert_eq!(plan.iterations, 10);
        assert_eq!(plan.argument_count.batch_len(), 5);
    }
}
