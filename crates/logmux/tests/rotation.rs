// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! Rotating file sink integration tests
//!
//! Size-based rotation and the backup window, on a real filesystem.

use logmux::{
    roll_files, rotated_path, FileSink, FileSinkConfig, Logger, PassFilter, RotationPolicy,
    Sink,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// 19 characters plus the newline: 20 bytes per record.
const RECORD: &str = "0123456789abcdefghi";

fn file_len(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[test]
fn test_size_rotation_keeps_two_backups() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = FileSinkConfig::new(dir.path(), "app")
        .policy(RotationPolicy::Size)
        .max_size(100)
        .max_copies(2);
    let sink = FileSink::new(config, Arc::new(PassFilter));
    let live = dir.path().join("app.log");

    for _ in 0..4 {
        sink.write_record(&RECORD).expect("write");
    }
    let before = file_len(&live);
    assert_eq!(before, 80);
    assert!(!rotated_path(&live, 1).exists());

    sink.write_record(&RECORD).expect("write");
    assert!(rotated_path(&live, 1).exists());
    assert_eq!(file_len(&rotated_path(&live, 1)), 100);
    assert!(file_len(&live) < before);
    assert_eq!(sink.bytes_written(), 0);

    for _ in 0..10 {
        sink.write_record(&RECORD).expect("write");
    }
    assert!(rotated_path(&live, 1).exists());
    assert!(rotated_path(&live, 2).exists());
    assert!(!rotated_path(&live, 3).exists());
}

#[test]
fn test_size_rotation_through_logger() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = FileSinkConfig::new(dir.path(), "svc")
        .extension(".txt")
        .max_size(100)
        .max_copies(3);
    let logger = Logger::builder("files")
        .sink("file", FileSink::new(config, Arc::new(PassFilter)))
        .start()
        .expect("startup");

    for _ in 0..12 {
        logger.log_message(RECORD);
    }
    logger.shut_down();

    let live = dir.path().join("svc.txt");
    assert!(rotated_path(&live, 1).exists());
    assert!(rotated_path(&live, 2).exists());
    assert!(!rotated_path(&live, 3).exists());
    assert_eq!(file_len(&live), 40);
    assert_eq!(logger.stats().write_errors, 0);
}

#[test]
fn test_rotation_window_invariant() {
    let dir = tempfile::tempdir().expect("tempdir");
    let live = dir.path().join("window.log");
    const MAX_COPIES: u32 = 3;

    for round in 0..10 {
        fs::write(&live, format!("round {}", round)).expect("write live file");
        roll_files(&live, MAX_COPIES).expect("roll");

        let backups = (1..=MAX_COPIES + 2)
            .filter(|i| rotated_path(&live, *i).exists())
            .count();
        assert!(backups <= MAX_COPIES as usize);
        assert!(!rotated_path(&live, MAX_COPIES + 1).exists());

        let newest = fs::read_to_string(rotated_path(&live, 1)).expect("read .1");
        assert_eq!(newest, format!("round {}", round));
    }

    let oldest = fs::read_to_string(rotated_path(&live, MAX_COPIES)).expect("read oldest");
    assert_eq!(oldest, "round 7");
}

#[test]
fn test_open_failure_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"file").expect("write blocker");

    let config = FileSinkConfig::new(blocker.join("logs"), "app");
    let err = FileSink::open(config, Arc::new(PassFilter)).expect_err("open must fail");

    assert!(err.is_resource_error());
    assert!(err.to_string().contains("not-a-dir"), "got {}", err);
}
