// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Formatting macros.
//!
//! `log_to!` targets an explicit logger. The per-severity macros target the
//! active logger of [`LoggerManager::global`](crate::LoggerManager::global),
//! creating the default one on first use. If it cannot be created the record
//! is dropped.

/// Log a formatted record to a specific logger.
///
/// The record target is the calling module path.
///
/// # Example
/// ```ignore
/// log_to!(logger, Severity::Warning, "queue depth {}", depth);
/// ```
#[macro_export]
macro_rules! log_to {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log_message(
            $crate::LogRecord::new($severity, format!($($arg)+)).with_target(module_path!()),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_default {
    ($severity:expr, $($arg:tt)+) => {
        if let Ok(logger) = $crate::LoggerManager::global().default_logger() {
            $crate::log_to!(logger, $severity, $($arg)+);
        }
    };
}

/// Trace-level message to the active global logger.
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => {
        $crate::__log_default!($crate::Severity::Trace, $($arg)+)
    };
}

/// Debug-level message to the active global logger.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::__log_default!($crate::Severity::Debug, $($arg)+)
    };
}

/// Info-level message to the active global logger.
///
/// # Example
/// ```ignore
/// log_info!("Service started on port {}", port);
/// ```
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::__log_default!($crate::Severity::Info, $($arg)+)
    };
}

/// Notice-level message to the active global logger.
#[macro_export]
macro_rules! log_notice {
    ($($arg:tt)+) => {
        $crate::__log_default!($crate::Severity::Notice, $($arg)+)
    };
}

/// Warning-level message to the active global logger.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::__log_default!($crate::Severity::Warning, $($arg)+)
    };
}

/// Error-level message to the active global logger.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__log_default!($crate::Severity::Error, $($arg)+)
    };
}

/// Critical-level message to the active global logger.
#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::__log_default!($crate::Severity::Critical, $($arg)+)
    };
}

/// Exception-level message to the active global logger.
#[macro_export]
macro_rules! log_exception {
    ($($arg:tt)+) => {
        $crate::__log_default!($crate::Severity::Exception, $($arg)+)
    };
}
