// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record filtering and line formatting.
//!
//! A filter decides whether a record reaches a sink and, if so, renders the
//! exact line the sink writes. Filters are immutable while shared: the mask
//! and label editors take `&mut self` and are meant for setup, before the
//! filter is wrapped in an `Arc` and handed to sinks.

use crate::record::{Record, Severity};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Maps a record to the line a sink should write, or `None` to suppress it.
pub trait Filter: Send + Sync {
    fn apply(&self, record: &dyn Record) -> Option<String>;
}

/// Line layout produced by [`SeverityFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    /// `2026-01-15 10:30:00.000 [INFO] message`
    #[default]
    Text,
    /// One compact JSON object per line.
    Json,
}

/// Severity mask plus text layout.
#[derive(Debug, Clone)]
pub struct SeverityFilter {
    allowed: [bool; 8],
    labels: [String; 8],
    format: LineFormat,
    utc: bool,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    message: &'a str,
}

impl Default for SeverityFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl SeverityFilter {
    /// Pass every severity.
    pub fn all() -> Self {
        Self {
            allowed: [true; 8],
            labels: Severity::ALL.map(|s| s.as_str().to_string()),
            format: LineFormat::Text,
            utc: false,
        }
    }

    /// Suppress every severity.
    pub fn none() -> Self {
        Self {
            allowed: [false; 8],
            ..Self::all()
        }
    }

    /// Pass only the listed severities.
    pub fn only(severities: &[Severity]) -> Self {
        let mut filter = Self::none();
        for &severity in severities {
            filter.allow(severity);
        }
        filter
    }

    /// Pass `min` and everything more severe.
    pub fn at_least(min: Severity) -> Self {
        let mut filter = Self::none();
        for severity in Severity::ALL.into_iter().filter(|s| *s >= min) {
            filter.allow(severity);
        }
        filter
    }

    /// Add a severity to the allow-set.
    pub fn allow(&mut self, severity: Severity) -> &mut Self {
        self.allowed[severity.index()] = true;
        self
    }

    /// Remove a severity from the allow-set.
    pub fn deny(&mut self, severity: Severity) -> &mut Self {
        self.allowed[severity.index()] = false;
        self
    }

    /// Replace the label printed for a severity.
    pub fn set_label(&mut self, severity: Severity, label: impl Into<String>) -> &mut Self {
        self.labels[severity.index()] = label.into();
        self
    }

    /// Select the line layout.
    pub fn format(&mut self, format: LineFormat) -> &mut Self {
        self.format = format;
        self
    }

    /// Render timestamps in UTC instead of local time.
    pub fn utc(&mut self, utc: bool) -> &mut Self {
        self.utc = utc;
        self
    }

    /// Whether a severity passes.
    pub fn allows(&self, severity: Severity) -> bool {
        self.allowed[severity.index()]
    }

    /// Label printed for a severity.
    pub fn label(&self, severity: Severity) -> &str {
        &self.labels[severity.index()]
    }

    fn render_timestamp(&self, ts: DateTime<Utc>) -> String {
        const LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.3f";
        if self.utc {
            ts.format(LAYOUT).to_string()
        } else {
            ts.with_timezone(&Local).format(LAYOUT).to_string()
        }
    }

    fn render_text(&self, record: &dyn Record) -> String {
        let mut parts = Vec::with_capacity(4);

        if let Some(ts) = record.timestamp() {
            parts.push(self.render_timestamp(ts));
        }
        parts.push(format!("[{}]", self.label(record.severity())));
        if let Some(target) = record.target() {
            parts.push(format!("[{}]", target));
        }
        parts.push(record.text().to_string());

        parts.join(" ")
    }

    fn render_json(&self, record: &dyn Record) -> String {
        let line = JsonLine {
            timestamp: record.timestamp().map(|ts| {
                if self.utc {
                    ts.to_rfc3339()
                } else {
                    ts.with_timezone(&Local).to_rfc3339()
                }
            }),
            level: self.label(record.severity()),
            target: record.target(),
            message: record.text(),
        };
        serde_json::to_string(&line).unwrap_or_else(|_| record.text().to_string())
    }
}

impl Filter for SeverityFilter {
    fn apply(&self, record: &dyn Record) -> Option<String> {
        if !self.allows(record.severity()) {
            return None;
        }

        Some(match self.format {
            LineFormat::Text => self.render_text(record),
            LineFormat::Json => self.render_json(record),
        })
    }
}

/// Passes every record through as its bare text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassFilter;

impl Filter for PassFilter {
    fn apply(&self, record: &dyn Record) -> Option<String> {
        Some(record.text().to_string())
    }
}
