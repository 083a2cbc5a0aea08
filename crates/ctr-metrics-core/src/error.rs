use thiserror::Error;

/// Validation and contract errors exposed by `ctr-metrics-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyTarget { field: &'static str },
    #[error("{field} must not contain whitespace: '{value}'")]
    TargetContainsWhitespace { field: &'static str, value: String },
    #[error("{field} length {len} exceeds max {max}")]
    TargetTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("timestamp must be RFC3339: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("environment variable {name} must be an unsigned integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("environment variable {name} must be an http(s) URL, got '{value}'")]
    InvalidUrl { name: &'static str, value: String },
}
