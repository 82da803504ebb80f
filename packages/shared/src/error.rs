//! Error types for pressroom.
//!
//! Library crates use [`PressroomError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Boxed cause attached to document conversion failures.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all pressroom operations.
#[derive(Debug, thiserror::Error)]
pub enum PressroomError {
    /// The source document could not be converted at all (corrupt or
    /// unsupported input). Fatal for the whole generation; callers never
    /// receive partial output alongside this.
    #[error("document conversion failed: {message}")]
    Conversion {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PressroomError>;

impl PressroomError {
    /// Create a conversion error from any displayable message.
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a conversion error with the underlying library error attached.
    pub fn conversion_with(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Conversion {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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
}
