//! Error taxonomy for housekeeping runs.
//!
//! Nothing here aborts a run: every variant is collected into the run report
//! and processing moves on to the next file. A missing deletion target is not
//! an error at all and never reaches this type (see [`is_missing_target`]).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single file could not be converted to LF line endings
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to read file: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write converted file: {0}")]
    Write(#[source] io::Error),

    #[error("file looks binary (contains NUL bytes)")]
    Binary,

    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}{}", fmt_stderr(.stderr))]
    ExternalFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

fn fmt_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// A non-fatal failure recorded during a housekeeping run
#[derive(Debug, Error)]
pub enum HousekeepingError {
    #[error("could not convert {}: {source}", .path.display())]
    ConversionFailure {
        path: PathBuf,
        #[source]
        source: ConversionError,
    },

    #[error("could not {action} {}: {source}", .path.display())]
    FileSystemError {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: io::Error,
    },
}

impl HousekeepingError {
    pub fn conversion(path: impl Into<PathBuf>, source: ConversionError) -> Self {
        HousekeepingError::ConversionFailure {
            path: path.into(),
            source,
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, action: &'static str, source: io::Error) -> Self {
        HousekeepingError::FileSystemError {
            path: path.into(),
            action,
            source,
        }
    }

    /// Path of the file or directory the failure is about
    pub fn path(&self) -> &std::path::Path {
        match self {
            HousekeepingError::ConversionFailure { path, .. }
            | HousekeepingError::FileSystemError { path, .. } => path,
        }
    }
}

/// True when an I/O error only means the target is already gone
pub fn is_missing_target(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}
