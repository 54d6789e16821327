// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! Two classes of failure exist:
//! - **Code errors**: the caller broke an invariant (unknown logger name,
//!   duplicate registration, queue swap on a running logger). They carry the
//!   call site that triggered them.
//! - **Resource errors**: the environment refused something (file cannot be
//!   opened, writer thread cannot be spawned). They carry the failing path or
//!   logger name.

use std::fmt;
use std::io;
use std::panic::Location;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = LogError> = std::result::Result<T, E>;

/// Invariant violations in calling code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// `front()` or `pop()` on an empty queue.
    EmptyQueue,
    /// No sink registered under this name.
    UnknownSink(String),
    /// No logger registered under this name.
    UnknownLogger(String),
    /// A logger is already registered under this name.
    DuplicateLogger(String),
    /// The reserved default logger cannot be removed.
    ReservedLogger(String),
    /// The queue of a running logger cannot be replaced.
    LoggerRunning(String),
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQueue => write!(f, "queue accessed while empty"),
            Self::UnknownSink(name) => write!(f, "no sink named '{}'", name),
            Self::UnknownLogger(name) => write!(f, "no logger named '{}'", name),
            Self::DuplicateLogger(name) => write!(f, "logger '{}' already registered", name),
            Self::ReservedLogger(name) => write!(f, "logger '{}' is reserved", name),
            Self::LoggerRunning(name) => {
                write!(f, "logger '{}' is running, queue cannot be replaced", name)
            }
        }
    }
}

/// Logging engine errors.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("code error at {location}: {kind}")]
    Code {
        kind: CodeError,
        location: &'static Location<'static>,
    },

    #[error("cannot open log file {}: {source}", path.display())]
    OpenFile { path: PathBuf, source: io::Error },

    #[error("write to {} failed: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("rotation of {} failed: {source}", path.display())]
    Rotate { path: PathBuf, source: io::Error },

    #[error("cannot start writer thread for logger '{logger}': {source}")]
    Spawn { logger: String, source: io::Error },
}

impl LogError {
    /// Build a code error located at the caller.
    #[track_caller]
    pub fn code(kind: CodeError) -> Self {
        Self::Code {
            kind,
            location: Location::caller(),
        }
    }

    /// True for invariant violations in calling code.
    pub fn is_code_error(&self) -> bool {
        matches!(self, Self::Code { .. })
    }

    /// True for environmental failures (I/O, threads).
    pub fn is_resource_error(&self) -> bool {
        !self.is_code_error()
    }

    /// The code error kind, if this is one.
    pub fn code_kind(&self) -> Option<&CodeError> {
        match self {
            Self::Code { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_error_records_caller() {
        let err = LogError::code(CodeError::UnknownLogger("net".into()));
        assert!(err.is_code_error());
        assert!(!err.is_resource_error());

        let msg = err.to_string();
        assert!(msg.contains("error.rs"), "missing location: {}", msg);
        assert!(msg.contains("no logger named 'net'"));
    }

    #[test]
    fn test_resource_error_mentions_path() {
        let err = LogError::OpenFile {
            path: PathBuf::from("/nonexistent/app.log"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.is_resource_error());
        assert!(err.code_kind().is_none());
        assert!(err.to_string().contains("/nonexistent/app.log"));
    }
}
