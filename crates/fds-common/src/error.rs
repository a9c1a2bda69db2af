//! Error types for FD Sentry.
//!
//! All collector-path failures are observational: the event that triggered
//! them is dropped and the caller is never blocked. Errors carry stable
//! codes and a category so the host tool's diagnostics can group them.

use serde::{Deserialize, Serialize};
use std::os::unix::io::RawFd;
use thiserror::Error;

/// Result type alias for FD Sentry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Descriptor classification failures.
    Classify,
    /// Configuration input errors.
    Config,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Classify => write!(f, "classify"),
            ErrorCategory::Config => write!(f, "config"),
        }
    }
}

/// Unified error type for FD Sentry.
#[derive(Error, Debug)]
pub enum Error {
    // Classification errors (10-19)
    #[error("descriptor {fd} is stale or closed: {source}")]
    StaleDescriptor {
        fd: RawFd,
        source: std::io::Error,
    },

    #[error("metadata query failed for descriptor {fd}: {source}")]
    MetadataQuery {
        fd: RawFd,
        source: std::io::Error,
    },

    // Configuration errors (20-29)
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable error code, grouped by category:
    /// - 10-19: classification errors
    /// - 20-29: configuration errors
    pub fn code(&self) -> u32 {
        match self {
            Error::StaleDescriptor { .. } => 10,
            Error::MetadataQuery { .. } => 11,
            Error::Config(_) => 20,
        }
    }

    /// Error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::StaleDescriptor { .. } | Error::MetadataQuery { .. } => ErrorCategory::Classify,
            Error::Config(_) => ErrorCategory::Config,
        }
    }

    /// The fd the error concerns, when there is one.
    pub fn fd(&self) -> Option<RawFd> {
        match self {
            Error::StaleDescriptor { fd, .. } | Error::MetadataQuery { fd, .. } => Some(*fd),
            Error::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn ebadf() -> io::Error {
        io::Error::from_raw_os_error(libc_ebadf())
    }

    // EBADF is 9 on every unix we care about; hardcoded to keep this crate
    // free of a libc dependency.
    fn libc_ebadf() -> i32 {
        9
    }

    #[test]
    fn test_error_code() {
        let err = Error::StaleDescriptor {
            fd: 3,
            source: ebadf(),
        };
        assert_eq!(err.code(), 10);
        assert_eq!(Error::Config("bad".into()).code(), 20);
    }

    #[test]
    fn test_error_category() {
        let err = Error::MetadataQuery {
            fd: 3,
            source: ebadf(),
        };
        assert_eq!(err.category(), ErrorCategory::Classify);
        assert_eq!(Error::Config("bad".into()).category(), ErrorCategory::Config);
    }

    #[test]
    fn test_error_fd() {
        let err = Error::StaleDescriptor {
            fd: 42,
            source: ebadf(),
        };
        assert_eq!(err.fd(), Some(42));
        assert_eq!(Error::Config("bad".into()).fd(), None);
    }

    #[test]
    fn test_error_message_includes_fd() {
        let err = Error::StaleDescriptor {
            fd: 42,
            source: ebadf(),
        };
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Classify.to_string(), "classify");
        assert_eq!(ErrorCategory::Config.to_string(), "config");
    }
}
