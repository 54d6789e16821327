// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Log records: the immutable unit handed from producers to sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log severity levels, least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    /// Very fine-grained tracing.
    Trace = 0,
    /// Development diagnostics.
    Debug = 1,
    /// Normal operation.
    #[default]
    Info = 2,
    /// Normal but significant conditions.
    Notice = 3,
    /// Potentially harmful situations.
    Warning = 4,
    /// Errors the application survives.
    Error = 5,
    /// Critical conditions.
    Critical = 6,
    /// Unexpected exceptions caught by the application.
    Exception = 7,
}

impl Severity {
    /// Every severity, in ascending order.
    pub const ALL: [Severity; 8] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Notice,
        Self::Warning,
        Self::Error,
        Self::Critical,
        Self::Exception,
    ];

    /// Get level name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Notice => "NOTICE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Exception => "EXCEPTION",
        }
    }

    /// Parse level from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Some(Self::Trace),
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "NOTICE" => Some(Self::Notice),
            "WARN" | "WARNING" => Some(Self::Warning),
            "ERROR" | "ERR" => Some(Self::Error),
            "CRITICAL" | "CRIT" | "FATAL" => Some(Self::Critical),
            "EXCEPTION" => Some(Self::Exception),
            _ => None,
        }
    }

    /// Position in [`Severity::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of log data.
///
/// Records are immutable once built. Ownership moves into the logger's queue
/// on submission; filters and sinks only ever see `&dyn Record`.
pub trait Record: Send + Sync + fmt::Debug {
    /// The message payload.
    fn text(&self) -> &str;

    /// Severity used for filtering. Plain text records are `Info`.
    fn severity(&self) -> Severity {
        Severity::Info
    }

    /// Construction instant, if the record carries one.
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Origin of the record (usually a module path).
    fn target(&self) -> Option<&str> {
        None
    }
}

impl Record for String {
    fn text(&self) -> &str {
        self
    }
}

impl Record for &'static str {
    fn text(&self) -> &str {
        self
    }
}

/// Severity-tagged, timestamped record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    severity: Severity,
    timestamp: DateTime<Utc>,
    text: String,
    target: Option<String>,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            timestamp: Utc::now(),
            text: text.into(),
            target: None,
        }
    }

    /// Create a record with an explicit timestamp.
    pub fn at(severity: Severity, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            severity,
            timestamp,
            text: text.into(),
            target: None,
        }
    }

    /// Set the origin of the record.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl Record for LogRecord {
    fn text(&self) -> &str {
        &self.text
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }

    fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}
