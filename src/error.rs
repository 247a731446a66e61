//! Error types for configuration resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the configuration core.
///
/// A missing, unreadable, or malformed config file is deliberately
/// *not* an error: the loader falls back to an empty document and the
/// defaults stand. What does surface here is fatal: a configuration
/// that violates its invariants is unusable and the caller must refuse
/// to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field failed its construction-time invariant.
    #[error("invalid value for `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A requested directory could not be created.
    ///
    /// Only `Settings::ensure_directories` produces this; validation
    /// itself never touches the filesystem.
    #[error("failed to create directory {}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
