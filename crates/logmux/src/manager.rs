// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named logger registry.
//!
//! A [`LoggerManager`] maps names to shared [`Logger`]s and tracks which one
//! is active. The reserved [`DEFAULT_LOGGER`] is created on first use: one
//! stdout sink passing every severity, writer already started.
//!
//! [`LoggerManager::global`] is the process-wide instance. Statics are never
//! dropped, so applications using it should call
//! [`terminate_all_loggers`](LoggerManager::terminate_all_loggers) before
//! exiting to drain pending records.

use crate::error::{CodeError, LogError, Result};
use crate::filter::SeverityFilter;
use crate::logger::Logger;
use crate::sink::StreamSink;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Reserved name of the lazily-created default logger.
pub const DEFAULT_LOGGER: &str = "DEFAULT";

#[derive(Default)]
struct Registry {
    loggers: BTreeMap<String, Arc<Logger>>,
    active: Option<String>,
}

/// Registry of named loggers.
#[derive(Default)]
pub struct LoggerManager {
    registry: Mutex<Registry>,
}

impl LoggerManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static LoggerManager {
        static GLOBAL: OnceLock<LoggerManager> = OnceLock::new();
        GLOBAL.get_or_init(LoggerManager::new)
    }

    /// Register a logger under `name`.
    #[track_caller]
    pub fn add_logger(
        &self,
        name: impl Into<String>,
        logger: impl Into<Arc<Logger>>,
    ) -> Result<Arc<Logger>> {
        let name = name.into();
        let mut registry = self.registry.lock();

        if registry.loggers.contains_key(&name) {
            return Err(LogError::code(CodeError::DuplicateLogger(name)));
        }

        let logger = logger.into();
        registry.loggers.insert(name.clone(), Arc::clone(&logger));
        tracing::debug!(logger = %name, "Logger registered");
        Ok(logger)
    }

    pub fn has_logger(&self, name: &str) -> bool {
        self.registry.lock().loggers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn logger_names(&self) -> Vec<String> {
        self.registry.lock().loggers.keys().cloned().collect()
    }

    /// Unregister and shut down a logger. Returns whether it existed.
    ///
    /// If it was active, the default logger (created if needed) becomes
    /// active before the registry is released.
    #[track_caller]
    pub fn remove_logger(&self, name: &str) -> Result<bool> {
        if name == DEFAULT_LOGGER {
            return Err(LogError::code(CodeError::ReservedLogger(name.to_string())));
        }

        let (removed, retarget) = {
            let mut registry = self.registry.lock();
            let removed = registry.loggers.remove(name);
            let retarget = if removed.is_some() && registry.active.as_deref() == Some(name) {
                registry.active = None;
                Self::activate_default(&mut registry).map(|_| ())
            } else {
                Ok(())
            };
            (removed, retarget)
        };

        let existed = match removed {
            Some(logger) => {
                logger.shut_down();
                tracing::debug!(logger = %name, "Logger removed");
                true
            }
            None => false,
        };

        retarget?;
        Ok(existed)
    }

    /// Make a registered logger the active one.
    #[track_caller]
    pub fn set_default_logger(&self, name: &str) -> Result<()> {
        let mut registry = self.registry.lock();
        if !registry.loggers.contains_key(name) {
            return Err(LogError::code(CodeError::UnknownLogger(name.to_string())));
        }
        registry.active = Some(name.to_string());
        Ok(())
    }

    /// Name of the active logger, if any.
    pub fn active_name(&self) -> Option<String> {
        self.registry.lock().active.clone()
    }

    /// The active logger, creating and starting the default one if none is.
    pub fn default_logger(&self) -> Result<Arc<Logger>> {
        let mut registry = self.registry.lock();

        if let Some(logger) = registry
            .active
            .as_ref()
            .and_then(|name| registry.loggers.get(name))
        {
            return Ok(Arc::clone(logger));
        }

        Self::activate_default(&mut registry)
    }

    /// Make `DEFAULT` active, creating and starting it if absent.
    fn activate_default(registry: &mut Registry) -> Result<Arc<Logger>> {
        let logger = match registry.loggers.get(DEFAULT_LOGGER) {
            Some(logger) => Arc::clone(logger),
            None => {
                let logger = Arc::new(
                    Logger::builder(DEFAULT_LOGGER)
                        .sink("stdout", StreamSink::stdout(Arc::new(SeverityFilter::all())))
                        .start()?,
                );
                registry
                    .loggers
                    .insert(DEFAULT_LOGGER.to_string(), Arc::clone(&logger));
                tracing::debug!("Default logger created");
                logger
            }
        };

        registry.active = Some(DEFAULT_LOGGER.to_string());
        Ok(logger)
    }

    /// Look up a registered logger.
    #[track_caller]
    pub fn named_logger(&self, name: &str) -> Result<Arc<Logger>> {
        match self.registry.lock().loggers.get(name) {
            Some(logger) => Ok(Arc::clone(logger)),
            None => Err(LogError::code(CodeError::UnknownLogger(name.to_string()))),
        }
    }

    /// Shut down every registered logger, then empty the registry.
    pub fn terminate_all_loggers(&self) {
        let loggers = {
            let mut registry = self.registry.lock();
            registry.active = None;
            std::mem::take(&mut registry.loggers)
        };

        let count = loggers.len();
        for logger in loggers.values() {
            logger.shut_down();
        }
        if count > 0 {
            tracing::debug!(count, "All loggers terminated");
        }
    }
}

impl std::fmt::Debug for LoggerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("LoggerManager")
            .field("loggers", &registry.loggers.keys().collect::<Vec<_>>())
            .field("active", &registry.active)
            .finish()
    }
}
