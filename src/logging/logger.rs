//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{ItemEntry, ItemStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are also written to `$XDG_CACHE_HOME/dotforge/<command>.log`
/// (default `~/.cache/dotforge/<command>.log`) by the file layer installed
/// in [`init_subscriber`](super::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    items: Mutex<Vec<ItemEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary; the file
    /// itself is created by the subscriber.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded item entries (test-only).
    #[cfg(test)]
    pub(crate) fn item_entries(&self) -> Vec<ItemEntry> {
        self.items.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record an item result for the summary.
    pub fn record_item(&self, name: &str, status: ItemStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.items.lock() {
            guard.push(ItemEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed items.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.items.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| t.status == ItemStatus::Failed)
                .count()
        })
    }

    /// Print the totals of all recorded items.
    pub fn print_summary(&self) {
        let items = match self.items.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if items.is_empty() {
            return;
        }

        let count = |status: ItemStatus| items.iter().filter(|i| i.status == status).count();
        let ok = count(ItemStatus::Ok);
        let unchanged = count(ItemStatus::Unchanged);
        let skipped = count(ItemStatus::Skipped);
        let dry_run = count(ItemStatus::DryRun);
        let failed = count(ItemStatus::Failed);

        self.stage("Summary");
        for item in items.iter().filter(|i| i.status == ItemStatus::Failed) {
            let suffix = item
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("\x1b[31m✗ {}{suffix}\x1b[0m", item.name));
        }
        self.info(&format!(
            "{} items: \x1b[32m{ok} ok\x1b[0m, \x1b[2m{unchanged} unchanged\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m",
            items.len()
        ));

        if let Some(path) = &self.log_file {
            self.debug(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_item(&self, name: &str, status: ItemStatus, message: Option<&str>) {
        self.record_item(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.item_entries().is_empty(), "expected empty item list");
    }

    #[test]
    fn record_item_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_item("~/.vimrc", ItemStatus::Skipped, Some("source missing"));
        let items = log.item_entries();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "~/.vimrc");
        assert_eq!(items[0].message, Some("source missing".to_string()));
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let (log, _tmp, _guard) = isolated_logger();
        assert_eq!(log.failure_count(), 0);
        log.record_item("a", ItemStatus::Ok, None);
        log.record_item("b", ItemStatus::Failed, Some("error 1"));
        log.record_item("c", ItemStatus::Failed, Some("error 2"));
        log.record_item("d", ItemStatus::Unchanged, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_item("via-trait", ItemStatus::Ok, None);
        assert_eq!(log.item_entries().len(), 1);
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let path = log.log_path().expect("log path should exist");
        let contents = fs::read_to_string(path).unwrap();
        assert!(
            contents.contains(&marker),
            "debug messages should always appear in the log file"
        );
    }

    #[test]
    fn warn_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("warn-marker-{}", std::process::id());
        log.warn(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[warn]"), "warn tag should appear in log file");
        assert!(contents.contains(&marker));
    }

    #[test]
    fn stage_written_to_file_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("stage-marker-{}", std::process::id());
        log.stage(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains(&format!("==> {marker}")));
    }

    #[test]
    fn dry_run_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("dryrun-marker-{}", std::process::id());
        log.dry_run(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains(&format!("[dry run] {marker}")));
    }

    #[test]
    fn summary_lists_failures_in_log_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_item("/home/u/.vimrc", ItemStatus::Failed, Some("permission denied"));
        log.record_item("/home/u/.gitconfig", ItemStatus::Ok, None);
        log.print_summary();
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("✗ /home/u/.vimrc (permission denied)"));
        assert!(contents.contains("2 items: 1 ok, 0 unchanged, 0 skipped, 0 dry-run, 1 failed"));
    }
}
