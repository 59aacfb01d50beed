//! Core logging types: item entries, status, and the [`Log`] trait.

/// Per-item result kept for the closing summary.
#[derive(Debug, Clone)]
pub struct ItemEntry {
    /// Human-readable item name (usually a target path).
    pub name: String,
    /// Final status of the item.
    pub status: ItemStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a processed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// The item was created or updated.
    Ok,
    /// The item was already in the desired state.
    Unchanged,
    /// The item was intentionally left alone.
    Skipped,
    /// The item would have been changed, but this is a dry run.
    DryRun,
    /// The item could not be applied.
    Failed,
}

/// Abstraction over logging backends.
///
/// Every engine call takes a `&dyn Log` so callers decide where output goes:
/// [`Logger`](super::Logger) for the CLI, [`MemoryLog`](super::MemoryLog) for
/// embedding and tests.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record an item result for the summary.
    fn record_item(&self, name: &str, status: ItemStatus, message: Option<&str>);
}
