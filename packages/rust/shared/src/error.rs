//! Error types for Serialbind.
//!
//! Library crates use [`SerialbindError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Serialbind operations.
#[derive(Debug, thiserror::Error)]
pub enum SerialbindError {
    /// Manifest loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during a stylesheet, document, or attachment fetch.
    /// The message carries the failing URL.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A fetch failure encountered while resolving image attachments.
    #[error("Unable to download attachments. Error message: {0}")]
    Attachment(#[source] Box<SerialbindError>),

    /// EPUB archive serialization error.
    #[error("archive error: {0}")]
    Archive(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SerialbindError>;

impl SerialbindError {
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

    /// Wrap a fetch failure with attachment-stage context.
    pub fn attachment(source: SerialbindError) -> Self {
        Self::Attachment(Box::new(source))
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
