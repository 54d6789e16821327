// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rotating file sink.
//!
//! On-disk layout:
//! - live file: `<dir>/<name><ext>`
//! - backups: `<dir>/<name><ext>.1` (most recent) up to `.<max_copies>`
//! - daily policy: `<dir>/<name>-<YYYYMMDD><ext>`, one file per day
//!
//! Rotation triggers:
//! - `Size`: checked after each write, rotates once the live file reaches
//!   `max_size` bytes.
//! - `Daily`: checked before each write, switches to a new dated file when
//!   the calendar date changes.
//! - `Days(n)`: checked before each write, rotates once `n` days have elapsed
//!   since the live file was created.
//! - `Use`: rotates when the sink opens a file that already exists, so every
//!   process run starts with a fresh file.

use crate::error::{LogError, Result};
use crate::filter::Filter;
use crate::record::Record;
use crate::sink::Sink;
use chrono::{DateTime, Local, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default size threshold: 10 MiB.
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// When a file sink starts a new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Rotate when the live file reaches `max_size` bytes.
    #[default]
    Size,
    /// One file per calendar date.
    Daily,
    /// Rotate after this many days (0 is treated as 1).
    Days(u32),
    /// Rotate an existing file when the sink opens it.
    Use,
}

/// File sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSinkConfig {
    /// Directory holding the live file and its backups.
    pub directory: PathBuf,
    /// Base file name, without extension.
    pub name: String,
    /// Extension including the leading dot (may be empty).
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Rotation trigger.
    #[serde(default)]
    pub policy: RotationPolicy,
    /// Numbered backups to keep (0 = discard on rotation).
    #[serde(default = "default_max_copies")]
    pub max_copies: u32,
    /// Size threshold in bytes for [`RotationPolicy::Size`].
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    /// Use UTC dates for daily names and day counting.
    #[serde(default)]
    pub utc: bool,
}

fn default_extension() -> String {
    ".log".to_string()
}

fn default_max_copies() -> u32 {
    5
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_SIZE
}

impl FileSinkConfig {
    /// Create a config with defaults (size policy, 10 MiB, 5 backups).
    pub fn new(directory: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            name: name.into(),
            extension: default_extension(),
            policy: RotationPolicy::default(),
            max_copies: default_max_copies(),
            max_size: default_max_size(),
            utc: false,
        }
    }

    /// Set the file extension (e.g. `".txt"`, or `""`).
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the rotation policy.
    pub fn policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the number of numbered backups kept.
    pub fn max_copies(mut self, max_copies: u32) -> Self {
        self.max_copies = max_copies;
        self
    }

    /// Set the size threshold in bytes.
    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Use UTC rather than local dates.
    pub fn utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    /// Live file path for the given date.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        let file_name = match self.policy {
            RotationPolicy::Daily => {
                format!("{}-{}{}", self.name, date.format("%Y%m%d"), self.extension)
            }
            _ => format!("{}{}", self.name, self.extension),
        };
        self.directory.join(file_name)
    }

    fn today(&self) -> NaiveDate {
        if self.utc {
            Utc::now().date_naive()
        } else {
            Local::now().date_naive()
        }
    }

    fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        if self.utc {
            ts.date_naive()
        } else {
            ts.with_timezone(&Local).date_naive()
        }
    }
}

/// Path of backup number `index`: `<path>.<index>`.
pub fn rotated_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}", index));
    path.with_file_name(name)
}

/// Shift the backlog of `path` by one slot.
///
/// With `max_copies == 0` the live file is deleted. Otherwise `.N` is deleted,
/// `.i` becomes `.i+1` for `i` in `N-1..=1`, and the live file becomes `.1`.
pub fn roll_files(path: &Path, max_copies: u32) -> io::Result<()> {
    if max_copies == 0 {
        if path.exists() {
            fs::remove_file(path)?;
        }
        return Ok(());
    }

    let oldest = rotated_path(path, max_copies);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }

    for index in (1..max_copies).rev() {
        let from = rotated_path(path, index);
        if from.exists() {
            fs::rename(&from, rotated_path(path, index + 1))?;
        }
    }

    if path.exists() {
        fs::rename(path, rotated_path(path, 1))?;
    }

    Ok(())
}

#[derive(Debug, Default)]
struct FileState {
    file: Option<File>,
    path: Option<PathBuf>,
    size: u64,
    opened_on: Option<NaiveDate>,
    created_on: Option<NaiveDate>,
    #[cfg(test)]
    skew_days: i64,
}

/// File sink with rotation and numbered backups.
pub struct FileSink {
    config: FileSinkConfig,
    filter: Arc<dyn Filter>,
    state: Mutex<FileState>,
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl FileSink {
    /// Create a sink. The file is opened lazily on the first written record.
    pub fn new(config: FileSinkConfig, filter: Arc<dyn Filter>) -> Self {
        Self {
            config,
            filter,
            state: Mutex::new(FileState::default()),
        }
    }

    /// Create a sink and open its file immediately.
    pub fn open(config: FileSinkConfig, filter: Arc<dyn Filter>) -> Result<Self> {
        let sink = Self::new(config, filter);
        sink.open_log_file()?;
        Ok(sink)
    }

    pub fn config(&self) -> &FileSinkConfig {
        &self.config
    }

    /// Path of the open file, if any.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().path.clone()
    }

    /// Size of the live file as tracked by the sink.
    pub fn bytes_written(&self) -> u64 {
        self.state.lock().size
    }

    /// Open (or reopen) the live file for appending.
    pub fn open_log_file(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.open_locked(&mut state)
    }

    /// Close, roll the backlog and reopen.
    pub fn rotate_log_file(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.rotate_locked(&mut state)
    }

    #[cfg(not(test))]
    fn today(&self, _state: &FileState) -> NaiveDate {
        self.config.today()
    }

    #[cfg(test)]
    fn today(&self, state: &FileState) -> NaiveDate {
        self.config.today() + chrono::Duration::days(state.skew_days)
    }

    fn open_locked(&self, state: &mut FileState) -> Result<()> {
        let today = self.today(state);
        let path = self.config.path_for(today);

        fs::create_dir_all(&self.config.directory).map_err(|source| LogError::OpenFile {
            path: path.clone(),
            source,
        })?;

        if self.config.policy == RotationPolicy::Use && path.exists() {
            roll_files(&path, self.config.max_copies).map_err(|source| LogError::Rotate {
                path: path.clone(),
                source,
            })?;
        }

        let existed = path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::OpenFile {
                path: path.clone(),
                source,
            })?;

        let metadata = file.metadata().ok();
        let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
        let created_on = if existed {
            metadata
                .as_ref()
                .and_then(|m| m.created().or_else(|_| m.modified()).ok())
                .map(|t| self.config.date_of(DateTime::<Utc>::from(t)))
                .unwrap_or(today)
        } else {
            today
        };

        tracing::debug!(path = %path.display(), size, "Opened log file");

        state.file = Some(file);
        state.path = Some(path);
        state.size = size;
        state.opened_on = Some(today);
        state.created_on = Some(created_on);

        Ok(())
    }

    fn close_locked(state: &mut FileState) {
        if let Some(mut file) = state.file.take() {
            let _ = file.flush();
        }
    }

    fn rotate_locked(&self, state: &mut FileState) -> Result<()> {
        Self::close_locked(state);

        let path = state
            .path
            .take()
            .unwrap_or_else(|| self.config.path_for(self.today(state)));

        roll_files(&path, self.config.max_copies).map_err(|source| LogError::Rotate {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            max_copies = self.config.max_copies,
            "Rotated log file"
        );

        self.open_locked(state)
    }

    /// Apply date-based rotation before a write.
    fn rotate_if_due(&self, state: &mut FileState) -> Result<()> {
        match self.config.policy {
            RotationPolicy::Daily => {
                let today = self.today(state);
                if state.opened_on != Some(today) {
                    Self::close_locked(state);
                    self.open_locked(state)?;
                }
            }
            RotationPolicy::Days(days) => {
                let today = self.today(state);
                let elapsed = state
                    .created_on
                    .map(|created| (today - created).num_days())
                    .unwrap_or(0);
                if elapsed >= i64::from(days.max(1)) {
                    self.rotate_locked(state)?;
                }
            }
            RotationPolicy::Size | RotationPolicy::Use => {}
        }
        Ok(())
    }

    /// Move the sink's calendar forward.
    #[cfg(test)]
    fn advance_days(&self, days: i64) {
        self.state.lock().skew_days += days;
    }
}

impl Sink for FileSink {
    fn write_record(&self, record: &dyn Record) -> Result<()> {
        let Some(line) = self.filter.apply(record) else {
            return Ok(());
        };

        let mut state = self.state.lock();
        if state.file.is_none() {
            self.open_locked(&mut state)?;
        }
        self.rotate_if_due(&mut state)?;

        let mut buf = line.into_bytes();
        buf.push(b'\n');

        let state = &mut *state;
        if let Some(file) = state.file.as_mut() {
            file.write_all(&buf).map_err(|source| LogError::Write {
                path: state.path.clone().unwrap_or_default(),
                source,
            })?;
            state.size += buf.len() as u64;
        }

        if self.config.policy == RotationPolicy::Size && state.size >= self.config.max_size {
            self.rotate_locked(state)?;
        }

        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        let state = &mut *state;
        if let Some(file) = state.file.as_mut() {
            file.flush().map_err(|source| LogError::Write {
                path: state.path.clone().unwrap_or_default(),
                source,
            })?;
        }
        Ok(())
    }

    fn filter(&self) -> &Arc<dyn Filter> {
        &self.filter
    }
}
