// error.rs — Error types for the policy subsystem.

use thiserror::Error;

/// Errors that can occur around policy evaluation.
///
/// `PolicyEntry::implies` itself is total and never produces one of these;
/// they surface from configuration loading, pattern validation and
/// diagnostic sinks.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The evaluator config file is not valid TOML for `EvaluatorConfig`.
    #[error("invalid evaluator config: {0}")]
    Config(#[from] toml::de::Error),

    /// A principal or resource pattern is malformed.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A diagnostic sink could not record a line (non-fatal).
    #[error("diagnostic sink error: {0}")]
    Sink(String),
}
