//! Error types for the file-essentials crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error accepted from filter and converter callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Comprehensive error type for all file-essentials operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Path does not exist.
    #[error("path not found: {}", .path.display())]
    NotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Expected a directory but found something else.
    #[error("{} exists, but is not a directory", .path.display())]
    NotADirectory {
        /// Path occupied by a non-directory.
        path: PathBuf,
    },

    /// Invalid path provided.
    #[error("invalid path '{}': {reason}", .path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// I/O error from the underlying filesystem.
    #[error("I/O error at {}", .path.display())]
    Io {
        /// Path the failing operation was applied to.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },

    /// A filter or converter callback failed.
    #[error("callback failed")]
    Callback(#[source] BoxError),

    /// Ran out of attempts to pick an unused random file name.
    #[error("no available file name after {attempts} attempts")]
    ExhaustedAttempts {
        /// How many names were tried.
        attempts: usize,
    },
}

impl Error {
    /// Annotates an I/O failure with the path it occurred on, folding the
    /// not-found case into [`Error::NotFound`].
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Wraps an arbitrary error raised by a caller-supplied callback.
    pub fn callback(source: impl Into<BoxError>) -> Self {
        Self::Callback(source.into())
    }
}

/// Result type alias for file-essentials operations.
pub type Result<T> = std::result::Result<T, Error>;
