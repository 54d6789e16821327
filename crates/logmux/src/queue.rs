// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ordering policies for records awaiting delivery.
//!
//! A queue owns its records until the writer thread takes them. The logger
//! serializes every access behind its own mutex, so implementations are plain
//! single-threaded containers.

use crate::error::{CodeError, LogError};
use crate::record::{Record, Severity};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

/// Ordering policy for pending records.
pub trait RecordQueue: Send {
    /// Insert a record at the position the policy dictates.
    fn push(&mut self, record: Box<dyn Record>);

    /// Remove and return the next record, if any.
    fn take(&mut self) -> Option<Box<dyn Record>>;

    /// Next record without removing it.
    fn peek(&self) -> Option<&dyn Record>;

    /// Number of pending records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next record to process.
    ///
    /// # Panics
    /// On an empty queue: the caller must check [`is_empty`](Self::is_empty).
    #[track_caller]
    fn front(&self) -> &dyn Record {
        match self.peek() {
            Some(record) => record,
            None => panic!("{}", LogError::code(CodeError::EmptyQueue)),
        }
    }

    /// Drop the front record.
    ///
    /// # Panics
    /// On an empty queue, like [`front`](Self::front).
    #[track_caller]
    fn pop(&mut self) {
        if self.take().is_none() {
            panic!("{}", LogError::code(CodeError::EmptyQueue));
        }
    }
}

/// Strict arrival order. Default queue of every logger.
#[derive(Debug, Default)]
pub struct FifoQueue {
    records: VecDeque<Box<dyn Record>>,
}

impl FifoQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordQueue for FifoQueue {
    fn push(&mut self, record: Box<dyn Record>) {
        self.records.push_back(record);
    }

    fn take(&mut self) -> Option<Box<dyn Record>> {
        self.records.pop_front()
    }

    fn peek(&self) -> Option<&dyn Record> {
        self.records.front().map(|r| r.as_ref())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Most recent record first.
#[derive(Debug, Default)]
pub struct LifoQueue {
    records: Vec<Box<dyn Record>>,
}

impl LifoQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordQueue for LifoQueue {
    fn push(&mut self, record: Box<dyn Record>) {
        self.records.push(record);
    }

    fn take(&mut self) -> Option<Box<dyn Record>> {
        self.records.pop()
    }

    fn peek(&self) -> Option<&dyn Record> {
        self.records.last().map(|r| r.as_ref())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug)]
struct Ranked {
    severity: Severity,
    seq: Reverse<u64>,
    record: Box<dyn Record>,
}

impl Ranked {
    fn key(&self) -> (Severity, Reverse<u64>) {
        (self.severity, self.seq)
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Most severe record first; arrival order among equal severities.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<Ranked>,
    next_seq: u64,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordQueue for PriorityQueue {
    fn push(&mut self, record: Box<dyn Record>) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Ranked {
            severity: record.severity(),
            seq: Reverse(seq),
            record,
        });
    }

    fn take(&mut self) -> Option<Box<dyn Record>> {
        self.heap.pop().map(|ranked| ranked.record)
    }

    fn peek(&self) -> Option<&dyn Record> {
        self.heap.peek().map(|ranked| ranked.record.as_ref())
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LogRecord;

    fn texts(queue: &mut dyn RecordQueue) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(record) = queue.take() {
            out.push(record.text().to_string());
        }
        out
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = FifoQueue::new();
        for text in ["a", "b", "c"] {
            queue.push(Box::new(text));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front().text(), "a");
        assert_eq!(texts(&mut queue), vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_lifo_order() {
        let mut queue = LifoQueue::new();
        for text in ["a", "b", "c"] {
            queue.push(Box::new(text));
        }
        assert_eq!(queue.front().text(), "c");
        assert_eq!(texts(&mut queue), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_priority_order_is_stable() {
        let mut queue = PriorityQueue::new();
        queue.push(Box::new(LogRecord::new(Severity::Info, "info-1")));
        queue.push(Box::new(LogRecord::new(Severity::Critical, "crit")));
        queue.push(Box::new(LogRecord::new(Severity::Info, "info-2")));
        queue.push(Box::new(LogRecord::new(Severity::Warning, "warn")));

        assert_eq!(
            texts(&mut queue),
            vec!["crit", "warn", "info-1", "info-2"]
        );
    }

    #[test]
    fn test_pop_removes_front() {
        let mut queue = FifoQueue::new();
        queue.push(Box::new("first"));
        queue.push(Box::new("second"));
        queue.pop();
        assert_eq!(queue.front().text(), "second");
    }

    #[test]
    #[should_panic(expected = "queue accessed while empty")]
    fn test_front_on_empty_panics() {
        let queue = FifoQueue::new();
        let _ = queue.front();
    }

    #[test]
    #[should_panic(expected = "queue accessed while empty")]
    fn test_pop_on_empty_panics() {
        let mut queue = PriorityQueue::new();
        queue.pop();
    }
}
