//! Unified error taxonomy for the crate.

use std::path::PathBuf;

/// Sub-kind of an [`Error::Io`] failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoErrorKind {
    PermissionDenied,
    DirectoryMissing,
    Other,
}

impl std::fmt::Display for IoErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IoErrorKind::PermissionDenied => "permission denied",
            IoErrorKind::DirectoryMissing => "missing directory",
            IoErrorKind::Other => "io error",
        };
        f.write_str(s)
    }
}

/// The error type returned by every fallible public operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    #[error("io error ({kind}) on {path}: {source}")]
    Io {
        path: PathBuf,
        kind: IoErrorKind,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input in {path}: {reason}")]
    MalformedInput { path: PathBuf, reason: String },

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Classify a raw `io::Error` encountered while opening `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let kind = match source.kind() {
            std::io::ErrorKind::PermissionDenied => IoErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => IoErrorKind::DirectoryMissing,
            _ => IoErrorKind::Other,
        };
        Error::Io { path, kind, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
