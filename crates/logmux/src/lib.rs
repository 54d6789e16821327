// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! logmux: asynchronous multi-sink logging engine
//!
//! Producers hand records to a [`Logger`] without waiting on I/O; one writer
//! thread per logger pushes each record through every registered sink.
//!
//! # Features
//!
//! - **Pluggable queues**: FIFO (default), LIFO, severity priority
//! - **Filters**: severity mask with custom labels, text or JSON lines
//! - **Sinks**: stdout/stderr or any `Write`, in-memory capture, rotating files
//! - **Rotation**: by size, by day, every N days, or on every open
//! - **Registry**: named loggers with a lazily-created default
//!
//! # Example
//!
//! ```rust,ignore
//! use logmux::{FileSink, FileSinkConfig, Logger, RotationPolicy, Severity, SeverityFilter};
//! use std::sync::Arc;
//!
//! let filter = Arc::new(SeverityFilter::at_least(Severity::Info));
//! let config = FileSinkConfig::new("logs", "app")
//!     .policy(RotationPolicy::Size)
//!     .max_size(10 * 1024 * 1024);
//!
//! let logger = Logger::builder("app")
//!     .sink("file", FileSink::new(config, filter))
//!     .start()?;
//!
//! logger.log(Severity::Info, "service started");
//! logger.shut_down();
//! ```

mod error;
mod file_sink;
mod filter;
mod logger;
mod macros;
mod manager;
mod queue;
mod record;
mod sink;

pub use error::{CodeError, LogError, Result};
pub use file_sink::{
    roll_files, rotated_path, FileSink, FileSinkConfig, RotationPolicy, DEFAULT_MAX_SIZE,
};
pub use filter::{Filter, LineFormat, PassFilter, SeverityFilter};
pub use logger::{Logger, LoggerBuilder, LoggerStats};
pub use manager::{LoggerManager, DEFAULT_LOGGER};
pub use queue::{FifoQueue, LifoQueue, PriorityQueue, RecordQueue};
pub use record::{LogRecord, Record, Severity};
pub use sink::{MemoryHandle, MemorySink, Sink, StreamSink};
