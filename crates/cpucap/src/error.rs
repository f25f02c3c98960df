//! Error types for the capacity override table
//!
//! Provides error handling for:
//! - Spec parsing (text → assignments)
//! - Assignment validation against the table bounds
//! - Snapshot allocation
//! - Configuration loading

use std::fmt;
use std::path::PathBuf;

/// Status codes handed back to the attribute layer (positive errno values)
pub mod errno {
    /// Out of memory
    pub const ENOMEM: i32 = 12;
    /// Invalid argument
    pub const EINVAL: i32 = 22;
    /// Result not representable
    pub const ERANGE: i32 = 34;
}

/// Which integer of a spec failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecField {
    /// The capacity after `:`
    Value,
    /// The single unit in `index:value`
    Unit,
    /// The first unit of `start-end:value`
    Start,
    /// The last unit of `start-end:value`
    End,
}

impl fmt::Display for SpecField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Value => "capacity",
            Self::Unit => "unit",
            Self::Start => "start unit",
            Self::End => "end unit",
        };
        f.write_str(name)
    }
}

/// Errors raised while parsing a configuration string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    /// A single spec does not fit the spec buffer
    #[error("spec too long: {len} bytes (limit {limit})")]
    SpecTooLong { len: usize, limit: usize },

    /// No `:` between units and capacity
    #[error("missing ':' in spec '{0}'")]
    MissingSeparator(String),

    /// An integer literal is malformed or does not fit its type
    #[error("invalid {field} in spec '{spec}'")]
    InvalidInteger {
        field: SpecField,
        spec: String,
        overflow: bool,
    },

    /// `start-end` with `start > end`
    #[error("invalid range {start}-{end}")]
    InvertedRange { start: u32, end: u32 },
}

impl SpecError {
    /// True when the literal was well formed but too large for its type
    #[inline]
    #[must_use]
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::InvalidInteger { overflow: true, .. })
    }
}

/// Main error type of the override controller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverrideError {
    /// Configuration text was absent
    #[error("invalid input: no configuration text")]
    InvalidInput,

    /// Configuration text did not match the grammar
    #[error("parse error: {0}")]
    Parse(#[from] SpecError),

    /// Unit index is not a possible unit of the table
    #[error("invalid unit {unit} (table has {units} units)")]
    OutOfRange { unit: u32, units: usize },

    /// Capacity exceeds the table maximum
    #[error("capacity {value} exceeds max {max} for unit {unit}")]
    ValueTooLarge { unit: u32, value: u64, max: u64 },

    /// The pristine snapshot could not be allocated
    #[error("cannot allocate snapshot of {units} units")]
    ResourceExhausted { units: usize },
}

impl OverrideError {
    /// Check if error came from the grammar rather than the table bounds
    #[inline]
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Negative status code for the attribute layer
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            Self::Parse(e) if e.is_overflow() => -errno::ERANGE,
            Self::ResourceExhausted { .. } => -errno::ENOMEM,
            Self::InvalidInput
            | Self::Parse(_)
            | Self::OutOfRange { .. }
            | Self::ValueTooLarge { .. } => -errno::EINVAL,
        }
    }
}

/// Errors while building a table from configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::OverrideConfig`]
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bounds or table contents are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Load-time capacities were rejected
    #[error("load-time capacities rejected: {0}")]
    Capacities(#[from] OverrideError),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid configuration error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Result type alias for override operations
pub type OverrideResult<T> = Result<T, OverrideError>;
