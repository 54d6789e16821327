// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Log sinks: stream and in-memory capture.
//!
//! The rotating file sink lives in [`crate::file_sink`].

use crate::error::Result;
use crate::filter::Filter;
use crate::record::Record;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Consumer of filtered log lines.
///
/// Sinks are shared with the writer thread behind a read lock, so the medium
/// is guarded inside the sink. A sink must do nothing at all when its filter
/// suppresses a record.
pub trait Sink: Send + Sync {
    /// Filter the record and write the resulting line.
    fn write_record(&self, record: &dyn Record) -> Result<()>;

    /// Flush buffered output.
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Filter applied by this sink.
    fn filter(&self) -> &Arc<dyn Filter>;
}

/// Writes lines to an already-open stream (stdout, stderr, any `Write`).
///
/// Writes are best-effort: a broken stream is ignored.
pub struct StreamSink {
    filter: Arc<dyn Filter>,
    stream: Mutex<Box<dyn Write + Send>>,
}

impl StreamSink {
    pub fn new(stream: impl Write + Send + 'static, filter: Arc<dyn Filter>) -> Self {
        Self {
            filter,
            stream: Mutex::new(Box::new(stream)),
        }
    }

    pub fn stdout(filter: Arc<dyn Filter>) -> Self {
        Self::new(io::stdout(), filter)
    }

    pub fn stderr(filter: Arc<dyn Filter>) -> Self {
        Self::new(io::stderr(), filter)
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink").finish_non_exhaustive()
    }
}

impl Sink for StreamSink {
    fn write_record(&self, record: &dyn Record) -> Result<()> {
        if let Some(line) = self.filter.apply(record) {
            let mut stream = self.stream.lock();
            let _ = writeln!(stream, "{}", line);
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let _ = self.stream.lock().flush();
        Ok(())
    }

    fn filter(&self) -> &Arc<dyn Filter> {
        &self.filter
    }
}

/// Captures lines in memory.
pub struct MemorySink {
    filter: Arc<dyn Filter>,
    lines: Arc<Mutex<Vec<String>>>,
}

/// Reader side of a [`MemorySink`], usable after the sink moved into a logger.
#[derive(Debug, Clone, Default)]
pub struct MemoryHandle {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new(filter: Arc<dyn Filter>) -> Self {
        Self {
            filter,
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle sharing this sink's buffer.
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            lines: Arc::clone(&self.lines),
        }
    }
}

impl fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySink")
            .field("lines", &self.lines.lock().len())
            .finish_non_exhaustive()
    }
}

impl Sink for MemorySink {
    fn write_record(&self, record: &dyn Record) -> Result<()> {
        if let Some(line) = self.filter.apply(record) {
            self.lines.lock().push(line);
        }
        Ok(())
    }

    fn filter(&self) -> &Arc<dyn Filter> {
        &self.filter
    }
}

impl MemoryHandle {
    /// Snapshot of captured lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Drop captured lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PassFilter, SeverityFilter};
    use crate::record::{LogRecord, Severity};

    /// `Write` target whose buffer stays readable after the sink owns it.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_stream_sink_appends_newline() {
        let buf = SharedBuf::default();
        let sink = StreamSink::new(buf.clone(), Arc::new(PassFilter));

        sink.write_record(&"one").unwrap();
        sink.write_record(&"two").unwrap();
        sink.flush().unwrap();

        assert_eq!(String::from_utf8(buf.0.lock().clone()).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_stream_sink_respects_filter() {
        let buf = SharedBuf::default();
        let filter = Arc::new(SeverityFilter::only(&[Severity::Error]));
        let sink = StreamSink::new(buf.clone(), filter);

        sink.write_record(&LogRecord::new(Severity::Info, "quiet")).unwrap();
        assert!(buf.0.lock().is_empty());
    }

    #[test]
    fn test_stream_sink_ignores_broken_stream() {
        let sink = StreamSink::new(BrokenPipe, Arc::new(PassFilter));
        assert!(sink.write_record(&"lost").is_ok());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn test_memory_sink_capture() {
        let sink = MemorySink::new(Arc::new(PassFilter));
        let handle = sink.handle();

        sink.write_record(&"a").unwrap();
        sink.write_record(&"b").unwrap();
        assert_eq!(handle.lines(), vec!["a", "b"]);
        assert_eq!(handle.len(), 2);

        handle.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_filter_shared_between_sinks() {
        let filter: Arc<dyn Filter> = Arc::new(PassFilter);
        let first = MemorySink::new(Arc::clone(&filter));
        let second = MemorySink::new(Arc::clone(&filter));

        assert!(Arc::ptr_eq(first.filter(), second.filter()));
        assert_eq!(Arc::strong_count(&filter), 3);
    }
}
