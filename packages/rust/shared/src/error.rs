//! Error types for reeltab.
//!
//! Library crates use [`ReeltabError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every error aborts the batch. A failed fetch, a selector that cannot be
//! parsed, or a column-length mismatch all leave no dataset and no chart
//! behind; there is no partial-result mode.

use std::path::PathBuf;

/// Top-level error type for all reeltab operations.
#[derive(Debug, thiserror::Error)]
pub enum ReeltabError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching the listing page.
    #[error("network error: {0}")]
    Network(String),

    /// Markup parsing or selector error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Normalization found no numeric token where a number was required.
    #[error("no numeric token in field '{field}': {text:?}")]
    NoNumericToken { field: String, text: String },

    /// Alignment was asked to insert past the end of the source sequence.
    #[error("invalid insertion position {position} for sequence of length {len}")]
    InvalidPosition { position: usize, len: usize },

    /// Sequences that must agree in length do not.
    #[error("length mismatch: {detail}")]
    LengthMismatch { detail: String },

    /// Data validation error (unexpected cardinality, unknown field, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Chart rendering or artifact writing error.
    #[error("render error: {0}")]
    Render(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReeltabError>;

impl ReeltabError {
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

    /// Create a length-mismatch error from any displayable detail.
    pub fn length_mismatch(detail: impl Into<String>) -> Self {
        Self::LengthMismatch {
            detail: detail.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
