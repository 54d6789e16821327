// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! logmux CLI
//!
//! Drive a logger with concurrent producers to exercise queues, filters and
//! file rotation.
//!
//! # Usage
//!
//! ```bash
//! # 4 producers, 1000 records each, to stderr
//! logmux --producers 4 --count 1000
//!
//! # Rotating JSON file, 1 MiB per file, keep 3 backups
//! logmux --output logs/app.log --format json --rotate 1M --rotate-keep 3
//!
//! # Daily files, warnings and above
//! logmux --output logs/app.log --policy daily --level warning
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use logmux::{
    FileSink, FileSinkConfig, Filter, LineFormat, Logger, LogRecord, PriorityQueue,
    RotationPolicy, Severity, SeverityFilter, StreamSink, DEFAULT_MAX_SIZE,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "logmux")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Asynchronous multi-sink logger exerciser")]
#[command(long_about = None)]
struct Cli {
    /// Output file path (default: stderr)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File rotation policy
    #[arg(long, value_enum, default_value = "size")]
    policy: PolicyArg,

    /// Rotation size for the size policy (e.g., 10M, 100K, 1G)
    #[arg(long)]
    rotate: Option<String>,

    /// Maximum number of rotated files to keep
    #[arg(long, default_value = "5")]
    rotate_keep: u32,

    /// Rotation period in days for the days policy
    #[arg(long, default_value = "7")]
    days: u32,

    /// Minimum severity written
    #[arg(short, long, value_enum, default_value = "trace")]
    level: LevelArg,

    /// Line format
    #[arg(short, long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Number of producer threads
    #[arg(short, long, default_value = "4")]
    producers: usize,

    /// Records per producer
    #[arg(short, long, default_value = "1000")]
    count: usize,

    /// Deliver most severe records first
    #[arg(long)]
    priority: bool,

    /// Verbose mode (show internal logs)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Size,
    Daily,
    Days,
    Use,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Trace,
    Debug,
    Info,
    Notice,
    #[value(alias = "warn")]
    Warning,
    Error,
    #[value(alias = "fatal")]
    Critical,
    Exception,
}

impl From<LevelArg> for Severity {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Trace => Severity::Trace,
            LevelArg::Debug => Severity::Debug,
            LevelArg::Info => Severity::Info,
            LevelArg::Notice => Severity::Notice,
            LevelArg::Warning => Severity::Warning,
            LevelArg::Error => Severity::Error,
            LevelArg::Critical => Severity::Critical,
            LevelArg::Exception => Severity::Exception,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for LineFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => LineFormat::Text,
            FormatArg::Json => LineFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing for internal logs
    let filter = if cli.verbose {
        EnvFilter::new("logmux=debug")
    } else {
        EnvFilter::new("logmux=info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let logger = Arc::new(build_logger(&cli)?);

    tracing::info!(
        producers = cli.producers,
        count = cli.count,
        format = ?cli.format,
        level = ?cli.level,
        "Starting logmux"
    );

    logger.startup().context("Failed to start logger")?;

    // Setup Ctrl+C handler
    let stop = Arc::new(AtomicBool::new(false));
    ctrlc_handler(Arc::clone(&stop));

    let producers: Vec<_> = (0..cli.producers)
        .map(|id| {
            let logger = Arc::clone(&logger);
            let stop = Arc::clone(&stop);
            let count = cli.count;
            thread::Builder::new()
                .name(format!("producer-{}", id))
                .spawn(move || produce(&logger, id, count, &stop))
                .context("Failed to spawn producer")
        })
        .collect::<Result<_>>()?;

    for producer in producers {
        if producer.join().is_err() {
            tracing::error!("Producer thread panicked");
        }
    }

    logger.shut_down();

    let stats = logger.stats();
    tracing::info!(
        records_logged = stats.records_logged,
        records_delivered = stats.records_delivered,
        write_errors = stats.write_errors,
        "Logger shutdown complete"
    );

    Ok(())
}

fn build_logger(cli: &Cli) -> Result<Logger> {
    let mut severity_filter = SeverityFilter::at_least(cli.level.into());
    severity_filter.format(cli.format.into());
    let filter: Arc<dyn Filter> = Arc::new(severity_filter);

    let mut builder = Logger::builder("logmux");
    if cli.priority {
        builder = builder.queue(PriorityQueue::new());
    }

    builder = match cli.output {
        Some(ref path) => {
            let config = file_config(cli, path)?;
            let sink = FileSink::open(config, filter)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            builder.sink("file", sink)
        }
        None => builder.sink("stderr", StreamSink::stderr(filter)),
    };

    Ok(builder.build())
}

fn file_config(cli: &Cli, path: &Path) -> Result<FileSinkConfig> {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        bail!("Invalid output path {}", path.display());
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let policy = match cli.policy {
        PolicyArg::Size => RotationPolicy::Size,
        PolicyArg::Daily => RotationPolicy::Daily,
        PolicyArg::Days => RotationPolicy::Days(cli.days),
        PolicyArg::Use => RotationPolicy::Use,
    };

    let max_size = match cli.rotate {
        Some(ref size) => match parse_size(size) {
            Some(bytes) => bytes,
            None => bail!("Invalid rotation size '{}'", size),
        },
        None => DEFAULT_MAX_SIZE,
    };

    Ok(FileSinkConfig::new(directory, stem)
        .extension(extension)
        .policy(policy)
        .max_copies(cli.rotate_keep)
        .max_size(max_size))
}

/// Log `count` records, cycling through severities.
fn produce(logger: &Logger, id: usize, count: usize, stop: &AtomicBool) {
    for seq in 0..count {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let severity = Severity::ALL[seq % Severity::ALL.len()];
        logger.log_message(
            LogRecord::new(severity, format!("producer {} record {}", id, seq))
                .with_target(format!("producer-{}", id)),
        );
    }
}

/// Parse size string like "10M", "100K", "1G".
fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim().to_uppercase();

    if let Some(num) = s.strip_suffix('K') {
        num.parse::<u64>().ok().map(|n| n * 1024)
    } else if let Some(num) = s.strip_suffix('M') {
        num.parse::<u64>().ok().map(|n| n * 1024 * 1024)
    } else if let Some(num) = s.strip_suffix('G') {
        num.parse::<u64>().ok().map(|n| n * 1024 * 1024 * 1024)
    } else {
        s.parse::<u64>().ok()
    }
}

/// Setup Ctrl+C handler.
fn ctrlc_handler(stop: Arc<AtomicBool>) {
    let _ = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, stopping producers...");
        stop.store(true, Ordering::Relaxed);
    });
}
