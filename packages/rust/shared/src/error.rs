//! Error types for startupintel.
//!
//! Library crates use [`StartupIntelError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Failures local to one source or one company ([`StartupIntelError::SourceUnavailable`],
//! [`StartupIntelError::Analysis`]) are absorbed by the pipeline and recorded as data.
//! Failures affecting the whole run ([`StartupIntelError::Config`],
//! [`StartupIntelError::Storage`]) propagate to the caller.

use std::path::PathBuf;

/// Top-level error type for all startupintel operations.
#[derive(Debug, thiserror::Error)]
pub enum StartupIntelError {
    /// Configuration loading or validation error, including missing credentials.
    #[error("config error: {message}")]
    Config { message: String },

    /// A single collector failed as a whole.
    #[error("source '{source_name}' unavailable: {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    /// Analysis of a single company failed part-way.
    #[error("analysis of '{company}' failed: {message}")]
    Analysis { company: String, message: String },

    /// Network/HTTP error while fetching content or repository metadata.
    #[error("network error: {0}")]
    Network(String),

    /// HTML/JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The caller aborted the run between stages.
    #[error("run cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StartupIntelError>;

impl StartupIntelError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a source failure for the named collector.
    pub fn source_unavailable(source: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source.into(),
            message: msg.into(),
        }
    }

    /// Create a per-company analysis failure.
    pub fn analysis(company: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Analysis {
            company: company.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error invalidates the whole run rather than one source or company.
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Storage(_) | Self::Io { .. } | Self::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = StartupIntelError::config("GitHub token required");
        assert_eq!(err.to_string(), "config error: GitHub token required");

        let err = StartupIntelError::source_unavailable("yc", "HTTP 503");
        assert_eq!(err.to_string(), "source 'yc' unavailable: HTTP 503");
    }

    #[test]
    fn local_failures_are_not_run_fatal() {
        assert!(!StartupIntelError::source_unavailable("geekwire", "timeout").is_run_fatal());
        assert!(!StartupIntelError::analysis("Acme", "rate limited").is_run_fatal());
        assert!(StartupIntelError::Storage("database locked".into()).is_run_fatal());
        assert!(StartupIntelError::config("bad").is_run_fatal());
    }
}
