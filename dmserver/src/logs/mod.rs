//! Logging subsystem
//!
//! `tracing` events pass through a reloadable level filter, then land in a
//! bounded in-memory buffer ([`SseLayer`]) and optionally on the console.
//! The buffer is served as a JSON dump and as a server-sent event stream.

mod api;
mod layer;

pub use api::{
    LogQuery, LogSetupRequest, LogSetupResponse, LogsApiDoc, create_logs_router, log_dump,
    log_setup_get, log_setup_post, log_sse,
};
pub use layer::SseLayer;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dmconfig::Config;
use serde::Serialize;
use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::Level;
use tracing_subscriber::{
    Registry, filter::LevelFilter, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;
const BROADCAST_CAPACITY: usize = 1000;

/// Levels accepted by `POST /api/log_setup`, most severe first
pub const LEVELS: [&str; 5] = ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

/// One captured event
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    fn level(&self) -> Option<Level> {
        Level::from_str(&self.level).ok()
    }
}

type ReloadHandle = reload::Handle<LevelFilter, Registry>;

/// Shared log buffer and live level
#[derive(Clone)]
pub struct LogState {
    buffer: Arc<RwLock<VecDeque<LogEntry>>>,
    capacity: usize,
    tx: broadcast::Sender<LogEntry>,
    max_level: Arc<RwLock<Level>>,
    reload_handle: Option<ReloadHandle>,
}

impl LogState {
    pub fn new(capacity: usize, initial: Level, reload_handle: ReloadHandle) -> Self {
        Self {
            reload_handle: Some(reload_handle),
            ..Self::build(capacity, initial)
        }
    }

    /// State not bound to a global subscriber
    pub fn detached(capacity: usize) -> Self {
        Self::build(capacity, Level::TRACE)
    }

    fn build(capacity: usize, initial: Level) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
            tx: broadcast::channel(BROADCAST_CAPACITY).0,
            max_level: Arc::new(RwLock::new(initial)),
            reload_handle: None,
        }
    }

    pub fn max_level(&self) -> Level {
        *self.max_level.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Changes the live level and reloads the subscriber filter
    pub fn set_max_level(&self, level: Level) -> Result<()> {
        if let Some(handle) = &self.reload_handle {
            handle
                .reload(LevelFilter::from_level(level))
                .context("Failed to reload the log level filter")?;
        }
        *self.max_level.write().unwrap_or_else(PoisonError::into_inner) = level;
        Ok(())
    }

    pub(crate) fn push(&self, entry: LogEntry) {
        {
            let mut buffer = self.buffer.write().unwrap_or_else(PoisonError::into_inner);
            while buffer.len() >= self.capacity {
                buffer.pop_front();
            }
            buffer.push_back(entry.clone());
        }
        // No receiver is not an error
        let _ = self.tx.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    pub fn dump(&self) -> Vec<LogEntry> {
        self.buffer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// True when `entry` is at or above the live level
    pub fn admits(&self, entry: &LogEntry) -> bool {
        entry.level().is_some_and(|level| level <= self.max_level())
    }
}

/// Logging options, normally read from `host.logger`
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    pub buffer_capacity: usize,
    pub min_level: Level,
    pub enable_console: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            min_level: Level::INFO,
            enable_console: true,
        }
    }
}

impl LoggingOptions {
    /// Reads `host.logger.*`; invalid values fall back to the defaults
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            buffer_capacity: config
                .get_log_cache_size()
                .unwrap_or(defaults.buffer_capacity),
            min_level: config
                .get_log_min_level()
                .ok()
                .and_then(|level| Level::from_str(&level).ok())
                .unwrap_or(defaults.min_level),
            enable_console: config
                .get_log_enable_console()
                .unwrap_or(defaults.enable_console),
        }
    }
}

/// Installs the global subscriber
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(options: LoggingOptions) -> Result<LogState> {
    let (filter, reload_handle) = reload::Layer::new(LevelFilter::from_level(options.min_level));
    let state = LogState::new(options.buffer_capacity, options.min_level, reload_handle);

    // The filter must come first so it applies to both outputs
    let subscriber = Registry::default()
        .with(filter)
        .with(SseLayer::new(state.clone()));

    let installed = if options.enable_console {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    } else {
        subscriber.try_init()
    };
    installed.context("A global tracing subscriber is already installed")?;

    Ok(state)
}
