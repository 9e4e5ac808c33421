//! Error taxonomy for file and tab operations, and the mapping from a failed
//! operation to the notice shown to the user.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The file operation that was being attempted when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Open,
    Save,
    OpenDirectory,
}

impl FileOp {
    /// Object phrase used in notices, e.g. "open this file".
    fn phrase(self) -> &'static str {
        match self {
            FileOp::Open => "open this file",
            FileOp::Save => "save this file",
            FileOp::OpenDirectory => "open this directory",
        }
    }
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileOp::Open => "open",
            FileOp::Save => "save",
            FileOp::OpenDirectory => "open directory",
        };
        f.write_str(s)
    }
}

/// User-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    PermissionDenied,
    NotFound,
    Unknown,
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot {op} {}: not found", path.display())]
    NotFound { op: FileOp, path: PathBuf },

    #[error("cannot {op} {}: permission denied", path.display())]
    PermissionDenied { op: FileOp, path: PathBuf },

    #[error("cannot {op} {}: already open in another tab", path.display())]
    AlreadyOpen { op: FileOp, path: PathBuf },

    #[error("cannot {op} {}: {source}", path.display())]
    Io {
        op: FileOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Classify an `io::Error` raised while performing `op` on `path`.
    pub fn from_io(op: FileOp, path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FileError::NotFound { op, path },
            io::ErrorKind::PermissionDenied => FileError::PermissionDenied { op, path },
            _ => FileError::Io {
                op,
                path,
                source: err,
            },
        }
    }

    pub fn op(&self) -> FileOp {
        match self {
            FileError::NotFound { op, .. }
            | FileError::PermissionDenied { op, .. }
            | FileError::AlreadyOpen { op, .. }
            | FileError::Io { op, .. } => *op,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileError::NotFound { path, .. }
            | FileError::PermissionDenied { path, .. }
            | FileError::AlreadyOpen { path, .. }
            | FileError::Io { path, .. } => path,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FileError::NotFound { .. } => ErrorCategory::NotFound,
            FileError::PermissionDenied { .. } => ErrorCategory::PermissionDenied,
            FileError::AlreadyOpen { .. } | FileError::Io { .. } => ErrorCategory::Unknown,
        }
    }

    /// The blocking notice shown to the user for this error.
    pub fn notice(&self) -> Notice {
        let (title, reason) = match self.category() {
            ErrorCategory::PermissionDenied => ("Permission error", "permission denied"),
            ErrorCategory::NotFound => {
                let reason = match self.op() {
                    FileOp::OpenDirectory => "directory not found",
                    FileOp::Open | FileOp::Save => "file not found",
                };
                ("File not found", reason)
            }
            ErrorCategory::Unknown => ("Unknown error", "unknown error"),
        };
        Notice::new(title, format!("Can't {}: {}", self.op().phrase(), reason))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TabError {
    #[error("tab index {index} out of range ({len} tabs open)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A blocking message for the user: a title and one line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}
