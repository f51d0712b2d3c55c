//! Crate-level errors and their stable codes.
//!
//! Codes follow the format `ARG-XXXX`:
//!
//! - ARG-1xxx: argument-model errors (bounds records, grammars)
//! - ARG-2xxx: configuration errors
//! - ARG-3xxx: runtime errors

use crate::bounds::BoundsError;
use crate::config::ConfigError;
use crate::runner::RunnerError;
use crate::space::TraversalError;
use serde::Serialize;
use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Model,
    Configuration,
    Runtime,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Configuration => write!(f, "configuration"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "ARG-1001")]
    BoundsParseError,
    #[serde(rename = "ARG-1002")]
    MissingParameterSpace,
    #[serde(rename = "ARG-1003")]
    InvalidParameterType,
    #[serde(rename = "ARG-1004")]
    InvalidBound,
    #[serde(rename = "ARG-1005")]
    InvalidTemplate,
    #[serde(rename = "ARG-1006")]
    InvalidDependencyKey,
    #[serde(rename = "ARG-1007")]
    InvalidExpectation,
    #[serde(rename = "ARG-1008")]
    TraversalDepthExceeded,

    #[serde(rename = "ARG-2001")]
    ConfigReadError,
    #[serde(rename = "ARG-2002")]
    ConfigParseError,
    #[serde(rename = "ARG-2003")]
    InvalidConfigValue,
    #[serde(rename = "ARG-2004")]
    UnsupportedBoundsFormat,

    #[serde(rename = "ARG-3001")]
    IoError,
    #[serde(rename = "ARG-3002")]
    WorkerPoolError,
    #[serde(rename = "ARG-3003")]
    WatchdogError,
    #[serde(rename = "ARG-3004")]
    ReportSerializeError,
    #[serde(rename = "ARG-3005")]
    SignalHandlerError,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BoundsParseError => "ARG-1001",
            Self::MissingParameterSpace => "ARG-1002",
            Self::InvalidParameterType => "ARG-1003",
            Self::InvalidBound => "ARG-1004",
            Self::InvalidTemplate => "ARG-1005",
            Self::InvalidDependencyKey => "ARG-1006",
            Self::InvalidExpectation => "ARG-1007",
            Self::TraversalDepthExceeded => "ARG-1008",
            Self::ConfigReadError => "ARG-2001",
            Self::ConfigParseError => "ARG-2002",
            Self::InvalidConfigValue => "ARG-2003",
            Self::UnsupportedBoundsFormat => "ARG-2004",
            Self::IoError => "ARG-3001",
            Self::WorkerPoolError => "ARG-3002",
            Self::WatchdogError => "ARG-3003",
            Self::ReportSerializeError => "ARG-3004",
            Self::SignalHandlerError => "ARG-3005",
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::BoundsParseError
            | Self::MissingParameterSpace
            | Self::InvalidParameterType
            | Self::InvalidBound
            | Self::InvalidTemplate
            | Self::InvalidDependencyKey
            | Self::InvalidExpectation
            | Self::TraversalDepthExceeded => ErrorCategory::Model,

            Self::ConfigReadError
            | Self::ConfigParseError
            | Self::InvalidConfigValue
            | Self::UnsupportedBoundsFormat => ErrorCategory::Configuration,

            Self::IoError
            | Self::WorkerPoolError
            | Self::WatchdogError
            | Self::ReportSerializeError
            | Self::SignalHandlerError => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any error that stops a run before a report can be produced.
#[derive(Debug)]
pub enum ArgprobeError {
    Bounds(BoundsError),
    Config(ConfigError),
    Runner(RunnerError),
    Traversal(TraversalError),
    Report(serde_json::Error),
    Signal(ctrlc::Error),
    Io(io::Error),
}

impl ArgprobeError {
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Bounds(e) => match e {
                BoundsError::Io(_) => ErrorCode::IoError,
                BoundsError::Json(_) | BoundsError::Yaml(_) => ErrorCode::BoundsParseError,
                BoundsError::MissingParameterSpace | BoundsError::AmbiguousParameterSpace => {
                    ErrorCode::MissingParameterSpace
                }
                BoundsError::MissingType { .. } | BoundsError::UnknownType { .. } => {
                    ErrorCode::InvalidParameterType
                }
                BoundsError::InvalidBound { .. } => ErrorCode::InvalidBound,
                BoundsError::InvalidTemplate { .. } => ErrorCode::InvalidTemplate,
                BoundsError::InvalidDependencyKey { .. } => ErrorCode::InvalidDependencyKey,
                BoundsError::InvalidExpectation { .. } => ErrorCode::InvalidExpectation,
                BoundsError::UnsupportedFormat { .. } => ErrorCode::UnsupportedBoundsFormat,
            },
            Self::Config(e) => match e {
                ConfigError::Io { .. } => ErrorCode::ConfigReadError,
                ConfigError::Toml { .. } => ErrorCode::ConfigParseError,
                ConfigError::InvalidValue { .. } => ErrorCode::InvalidConfigValue,
            },
            Self::Runner(RunnerError::Pool(_)) => ErrorCode::WorkerPoolError,
            Self::Runner(RunnerError::Watchdog(_)) => ErrorCode::WatchdogError,
            Self::Traversal(_) => ErrorCode::TraversalDepthExceeded,
            Self::Report(_) => ErrorCode::ReportSerializeError,
            Self::Signal(_) => ErrorCode::SignalHandlerError,
            Self::Io(_) => ErrorCode::IoError,
        }
    }

    /// Structured form for `--json` output.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        let code = self.code();
        ErrorResponse {
            code: code.as_str(),
            category: code.category(),
            message: self.to_string(),
        }
    }
}

impl fmt::Display for ArgprobeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounds(e) => write!(f, "bounds: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Runner(e) => write!(f, "{e}"),
            Self::Traversal(e) => write!(f, "{e}"),
            Self::Report(e) => write!(f, "failed to serialize report: {e}"),
            Self::Signal(e) => write!(f, "failed to install interrupt handler: {e}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for ArgprobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bounds(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Runner(e) => Some(e),
            Self::Traversal(e) => Some(e),
            Self::Report(e) => Some(e),
            Self::Signal(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<BoundsError> for ArgprobeError {
    fn from(e: BoundsError) -> Self {
        Self::Bounds(e)
    }
}

impl From<ConfigError> for ArgprobeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RunnerError> for ArgprobeError {
    fn from(e: RunnerError) -> Self {
        Self::Runner(e)
    }
}

impl From<TraversalError> for ArgprobeError {
    fn from(e: TraversalError) -> Self {
        Self::Traversal(e)
    }
}

impl From<serde_json::Error> for ArgprobeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Report(e)
    }
}

impl From<ctrlc::Error> for ArgprobeError {
    fn from(e: ctrlc::Error) -> Self {
        Self::Signal(e)
    }
}

impl From<io::Error> for ArgprobeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub category: ErrorCategory,
    pub message: String,
}
