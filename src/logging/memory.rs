//! In-memory [`Log`] implementation.
use std::sync::Mutex;

use super::types::{ItemEntry, ItemStatus, Log};

/// Severity of a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Stage header.
    Stage,
    /// Informational.
    Info,
    /// Debug.
    Debug,
    /// Warning.
    Warn,
    /// Error.
    Error,
    /// Dry-run action.
    DryRun,
}

/// A [`Log`] that keeps every message in memory instead of printing it.
///
/// Useful when embedding the engine, and for asserting on warnings.
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: Mutex<Vec<(Level, String)>>,
    items: Mutex<Vec<ItemEntry>>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, msg: &str) {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((level, msg.to_string()));
    }

    /// All messages captured at `level`, in order.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// All recorded items, in order.
    #[must_use]
    pub fn items(&self) -> Vec<ItemEntry> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push(Level::Stage, msg);
    }

    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn debug(&self, msg: &str) {
        self.push(Level::Debug, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }

    fn dry_run(&self, msg: &str) {
        self.push(Level::DryRun, msg);
    }

    fn record_item(&self, name: &str, status: ItemStatus, message: Option<&str>) {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(ItemEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }
}
