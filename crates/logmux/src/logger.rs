// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logger: one queue, named sinks, one writer thread.
//!
//! # Architecture
//!
//! 1. **Producers** call [`Logger::log_message`]: the record is pushed into
//!    the queue under a short critical section and the writer is signalled.
//! 2. **Writer thread** sleeps on the condvar while the queue is empty, then
//!    takes records one at a time and offers each to every registered sink
//!    before taking the next.
//! 3. **Shutdown** raises the termination flag and wakes the writer, which
//!    drains the queue before exiting. Records that arrive after the writer
//!    exits are drained synchronously by [`Logger::shut_down`].
//!
//! The queue mutex and the sink-map lock are independent: producers never
//! wait on sink I/O.

use crate::error::{CodeError, LogError, Result};
use crate::queue::{FifoQueue, RecordQueue};
use crate::record::{LogRecord, Record, Severity};
use crate::sink::Sink;
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Logger counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggerStats {
    /// Records accepted by `log_message`.
    pub records_logged: u64,
    /// Records offered to the sink set.
    pub records_delivered: u64,
    /// Sink writes that failed.
    pub write_errors: u64,
    /// Records still queued.
    pub pending: usize,
}

/// State shared between the logger handle and its writer thread.
struct Shared {
    name: String,
    queue: Mutex<Box<dyn RecordQueue>>,
    work_available: Condvar,
    terminate: AtomicBool,
    sinks: RwLock<BTreeMap<String, Box<dyn Sink>>>,
    records_logged: AtomicU64,
    records_delivered: AtomicU64,
    write_errors: AtomicU64,
}

impl Shared {
    /// Writer thread body.
    fn run(&self) {
        tracing::debug!(logger = %self.name, "Writer thread started");

        while let Some(record) = self.next_record() {
            self.dispatch(record.as_ref());
        }

        tracing::debug!(logger = %self.name, "Writer thread stopped");
    }

    /// Block until a record is available, or return `None` once the queue is
    /// drained and termination was requested.
    fn next_record(&self) -> Option<Box<dyn Record>> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(record) = queue.take() {
                return Some(record);
            }
            if self.terminate.load(Ordering::Acquire) {
                return None;
            }
            self.work_available.wait(&mut queue);
        }
    }

    fn try_next_record(&self) -> Option<Box<dyn Record>> {
        self.queue.lock().take()
    }

    /// Offer one record to every registered sink.
    fn dispatch(&self, record: &dyn Record) {
        let sinks = self.sinks.read();
        for (name, sink) in sinks.iter() {
            if let Err(err) = sink.write_record(record) {
                self.write_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    logger = %self.name,
                    sink = %name,
                    error = %err,
                    "Sink write failed"
                );
            }
        }
        self.records_delivered.fetch_add(1, Ordering::Relaxed);
    }

    fn flush_sinks(&self) -> Result<()> {
        let sinks = self.sinks.read();
        let mut first_err = None;
        for (name, sink) in sinks.iter() {
            if let Err(err) = sink.flush() {
                tracing::warn!(logger = %self.name, sink = %name, error = %err, "Sink flush failed");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Asynchronous multi-sink logger.
pub struct Logger {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Logger {
    /// Create a stopped logger with a FIFO queue and no sinks.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_queue(name, FifoQueue::new())
    }

    /// Create a stopped logger with the given queue policy.
    pub fn with_queue(name: impl Into<String>, queue: impl RecordQueue + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                queue: Mutex::new(Box::new(queue)),
                work_available: Condvar::new(),
                terminate: AtomicBool::new(false),
                sinks: RwLock::new(BTreeMap::new()),
                records_logged: AtomicU64::new(0),
                records_delivered: AtomicU64::new(0),
                write_errors: AtomicU64::new(0),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Create a builder.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Replace the queue policy. Pending records move to the new queue.
    ///
    /// Only allowed while the writer thread is stopped.
    #[track_caller]
    pub fn add_queue(&self, queue: impl RecordQueue + 'static) -> Result<()> {
        let worker = self.worker.lock();
        if worker.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(LogError::code(CodeError::LoggerRunning(
                self.shared.name.clone(),
            )));
        }

        let mut replacement: Box<dyn RecordQueue> = Box::new(queue);
        let mut current = self.shared.queue.lock();
        while let Some(record) = current.take() {
            replacement.push(record);
        }
        *current = replacement;
        Ok(())
    }

    /// Register a sink, returning the one it replaces.
    pub fn add_sink(
        &self,
        name: impl Into<String>,
        sink: impl Sink + 'static,
    ) -> Option<Box<dyn Sink>> {
        self.add_boxed_sink(name, Box::new(sink))
    }

    /// Register an already boxed sink, returning the one it replaces.
    pub fn add_boxed_sink(
        &self,
        name: impl Into<String>,
        sink: Box<dyn Sink>,
    ) -> Option<Box<dyn Sink>> {
        self.shared.sinks.write().insert(name.into(), sink)
    }

    /// Unregister a sink. Returns whether it existed.
    pub fn remove_sink(&self, name: &str) -> bool {
        let removed = self.shared.sinks.write().remove(name);
        if let Some(sink) = removed {
            let _ = sink.flush();
            true
        } else {
            false
        }
    }

    pub fn has_sink(&self, name: &str) -> bool {
        self.shared.sinks.read().contains_key(name)
    }

    /// Registered sink names, sorted.
    pub fn sink_names(&self) -> Vec<String> {
        self.shared.sinks.read().keys().cloned().collect()
    }

    /// Run `f` against a registered sink.
    #[track_caller]
    pub fn with_sink<R>(&self, name: &str, f: impl FnOnce(&dyn Sink) -> R) -> Result<R> {
        let sinks = self.shared.sinks.read();
        match sinks.get(name) {
            Some(sink) => Ok(f(sink.as_ref())),
            None => Err(LogError::code(CodeError::UnknownSink(name.to_string()))),
        }
    }

    /// Queue a record for delivery and wake the writer.
    pub fn log_message(&self, record: impl Record + 'static) {
        self.log_boxed(Box::new(record));
    }

    /// Queue an already boxed record.
    pub fn log_boxed(&self, record: Box<dyn Record>) {
        self.shared.queue.lock().push(record);
        self.shared.records_logged.fetch_add(1, Ordering::Relaxed);
        self.shared.work_available.notify_one();
    }

    /// Queue a severity-tagged text record.
    pub fn log(&self, severity: Severity, text: impl Into<String>) {
        self.log_message(LogRecord::new(severity, text));
    }

    /// Start the writer thread. No-op if it is already running.
    pub fn startup(&self) -> Result<()> {
        let mut worker = self.worker.lock();

        if let Some(handle) = worker.as_ref() {
            if !handle.is_finished() {
                return Ok(());
            }
        }
        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                tracing::error!(logger = %self.shared.name, "Writer thread had panicked");
            }
        }

        self.shared.terminate.store(false, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(format!("logmux-{}", self.shared.name))
            .spawn(move || shared.run())
            .map_err(|source| LogError::Spawn {
                logger: self.shared.name.clone(),
                source,
            })?;

        *worker = Some(handle);
        Ok(())
    }

    /// Whether the writer thread is alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Stop the writer thread and deliver every queued record.
    ///
    /// Returns once all records queued before the call have been offered to
    /// every sink and the sinks have been flushed.
    pub fn shut_down(&self) {
        let mut worker = self.worker.lock();

        if let Some(handle) = worker.take() {
            {
                let _queue = self.shared.queue.lock();
                self.shared.terminate.store(true, Ordering::Release);
            }
            self.shared.work_available.notify_all();

            if handle.join().is_err() {
                tracing::error!(logger = %self.shared.name, "Writer thread panicked");
            }
        }

        let mut drained = 0usize;
        while let Some(record) = self.shared.try_next_record() {
            self.shared.dispatch(record.as_ref());
            drained += 1;
        }
        if drained > 0 {
            tracing::debug!(logger = %self.shared.name, drained, "Drained records at shutdown");
        }

        let _ = self.shared.flush_sinks();
    }

    /// Flush every sink.
    pub fn flush(&self) -> Result<()> {
        self.shared.flush_sinks()
    }

    /// Number of queued records.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn stats(&self) -> LoggerStats {
        LoggerStats {
            records_logged: self.shared.records_logged.load(Ordering::Relaxed),
            records_delivered: self.shared.records_delivered.load(Ordering::Relaxed),
            write_errors: self.shared.write_errors.load(Ordering::Relaxed),
            pending: self.pending(),
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shut_down();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.shared.name)
            .field("sinks", &self.sink_names())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    name: String,
    queue: Option<Box<dyn RecordQueue>>,
    sinks: Vec<(String, Box<dyn Sink>)>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: None,
            sinks: Vec::new(),
        }
    }

    /// Use a specific queue policy.
    pub fn queue(mut self, queue: impl RecordQueue + 'static) -> Self {
        self.queue = Some(Box::new(queue));
        self
    }

    /// Register a sink.
    pub fn sink(mut self, name: impl Into<String>, sink: impl Sink + 'static) -> Self {
        self.sinks.push((name.into(), Box::new(sink)));
        self
    }

    /// Build a stopped logger.
    pub fn build(self) -> Logger {
        let logger = Logger::new(self.name);
        if let Some(queue) = self.queue {
            *logger.shared.queue.lock() = queue;
        }
        for (name, sink) in self.sinks {
            logger.add_boxed_sink(name, sink);
        }
        logger
    }

    /// Build and start the writer thread.
    pub fn start(self) -> Result<Logger> {
        let logger = self.build();
        logger.startup()?;
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filter, PassFilter};
    use crate::queue::PriorityQueue;
    use crate::sink::MemorySink;
    use std::time::{Duration, Instant};

    fn memory() -> (MemorySink, crate::sink::MemoryHandle) {
        let sink = MemorySink::new(Arc::new(PassFilter));
        let handle = sink.handle();
        (sink, handle)
    }

    /// Sink that always fails.
    struct FailingSink(Arc<dyn Filter>);

    impl Sink for FailingSink {
        fn write_record(&self, _record: &dyn Record) -> Result<()> {
            Err(LogError::Write {
                path: "failing".into(),
                source: std::io::Error::other("boom"),
            })
        }

        fn filter(&self) -> &Arc<dyn Filter> {
            &self.0
        }
    }

    fn wait_for(mut cond: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "condition not reached");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_delivery_while_running() {
        let (sink, handle) = memory();
        let logger = Logger::builder("t").sink("mem", sink).start().unwrap();
        assert!(logger.is_running());

        logger.log_message("hello");
        wait_for(|| handle.len() == 1);
        assert_eq!(handle.lines(), vec!["hello"]);

        logger.shut_down();
        assert!(!logger.is_running());
    }

    #[test]
    fn test_startup_is_idempotent() {
        let logger = Logger::new("t");
        logger.startup().unwrap();
        logger.startup().unwrap();
        assert!(logger.is_running());
        logger.shut_down();
        logger.shut_down();
        assert!(!logger.is_running());
    }

    #[test]
    fn test_restart_after_shutdown() {
        let (sink, handle) = memory();
        let logger = Logger::builder("t").sink("mem", sink).start().unwrap();
        logger.log_message("first");
        logger.shut_down();

        logger.startup().unwrap();
        logger.log_message("second");
        logger.shut_down();

        assert_eq!(handle.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_records_before_startup_are_kept() {
        let (sink, handle) = memory();
        let logger = Logger::builder("t").sink("mem", sink).build();

        logger.log_message("early");
        assert_eq!(logger.pending(), 1);
        assert!(handle.is_empty());

        logger.startup().unwrap();
        logger.shut_down();
        assert_eq!(handle.lines(), vec!["early"]);
    }

    #[test]
    fn test_shutdown_without_startup_drains() {
        let (sink, handle) = memory();
        let logger = Logger::builder("t").sink("mem", sink).build();
        logger.log_message("a");
        logger.log_message("b");
        logger.shut_down();
        assert_eq!(handle.lines(), vec!["a", "b"]);
        assert_eq!(logger.pending(), 0);
    }

    #[test]
    fn test_drop_drains() {
        let (sink, handle) = memory();
        {
            let logger = Logger::builder("t").sink("mem", sink).start().unwrap();
            for i in 0..100 {
                logger.log_message(format!("msg {}", i));
            }
        }
        assert_eq!(handle.len(), 100);
    }

    #[test]
    fn test_add_queue_rejected_while_running() {
        let logger = Logger::new("t");
        logger.startup().unwrap();

        let err = logger.add_queue(PriorityQueue::new()).unwrap_err();
        assert_eq!(
            err.code_kind(),
            Some(&CodeError::LoggerRunning("t".to_string()))
        );

        logger.shut_down();
        assert!(logger.add_queue(PriorityQueue::new()).is_ok());
    }

    #[test]
    fn test_add_queue_keeps_pending_records() {
        let (sink, handle) = memory();
        let logger = Logger::builder("t").sink("mem", sink).build();
        logger.log(Severity::Info, "info");
        logger.log(Severity::Critical, "critical");

        logger.add_queue(PriorityQueue::new()).unwrap();
        assert_eq!(logger.pending(), 2);
        logger.log(Severity::Error, "error");

        logger.shut_down();
        assert_eq!(handle.lines(), vec!["critical", "error", "info"]);
    }

    #[test]
    fn test_sink_registration() {
        let logger = Logger::new("t");
        let (first, _) = memory();
        let (second, _) = memory();

        assert!(logger.add_sink("b", first).is_none());
        assert!(logger.add_sink("a", second).is_none());
        assert_eq!(logger.sink_names(), vec!["a", "b"]);
        assert!(logger.has_sink("a"));

        assert!(logger.remove_sink("a"));
        assert!(!logger.remove_sink("a"));
        assert_eq!(logger.sink_names(), vec!["b"]);
    }

    #[test]
    fn test_add_sink_replaces() {
        let logger = Logger::new("t");
        let (first, first_handle) = memory();
        let (second, second_handle) = memory();

        logger.add_sink("mem", first);
        assert!(logger.add_sink("mem", second).is_some());

        logger.log_message("x");
        logger.shut_down();
        assert!(first_handle.is_empty());
        assert_eq!(second_handle.lines(), vec!["x"]);
    }

    #[test]
    fn test_with_sink_unknown_is_code_error() {
        let logger = Logger::new("t");
        let err = logger.with_sink("missing", |_| ()).unwrap_err();
        assert!(err.is_code_error());
        assert_eq!(
            err.code_kind(),
            Some(&CodeError::UnknownSink("missing".to_string()))
        );
    }

    #[test]
    fn test_failing_sink_does_not_stop_others() {
        let (sink, handle) = memory();
        let logger = Logger::builder("t")
            .sink("bad", FailingSink(Arc::new(PassFilter)))
            .sink("mem", sink)
            .start()
            .unwrap();

        logger.log_message("one");
        logger.log_message("two");
        logger.shut_down();

        assert_eq!(handle.lines(), vec!["one", "two"]);
        let stats = logger.stats();
        assert_eq!(stats.records_logged, 2);
        assert_eq!(stats.records_delivered, 2);
        assert_eq!(stats.write_errors, 2);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn test_writer_thread_name() {
        struct ThreadNameSink(Arc<dyn Filter>, Arc<Mutex<Option<String>>>);

        impl Sink for ThreadNameSink {
            fn write_record(&self, _record: &dyn Record) -> Result<()> {
                *self.1.lock() = thread::current().name().map(str::to_string);
                Ok(())
            }

            fn filter(&self) -> &Arc<dyn Filter> {
                &self.0
            }
        }

        let seen = Arc::new(Mutex::new(None));
        let logger = Logger::builder("audit")
            .sink("probe", ThreadNameSink(Arc::new(PassFilter), Arc::clone(&seen)))
            .start()
            .unwrap();
        logger.log_message("x");
        wait_for(|| seen.lock().is_some());
        logger.shut_down();

        assert_eq!(seen.lock().as_deref(), Some("logmux-audit"));
    }
}
