//! Helpers shared by the console and file layers.
use std::path::PathBuf;

/// Timestamp written at the start of each log file session.
pub(super) const SESSION_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Timestamp prefixed to each log file line.
pub(super) const LINE_FORMAT: &str = "%H:%M:%S";

/// Remove ANSI CSI escape sequences (`ESC [ ... final-byte`).
///
/// A lone `ESC` followed by anything other than `[` is dropped together with
/// that character.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            // Parameters and intermediates run until the final byte.
            let _ = chars.by_ref().find(|ch| ('@'..='~').contains(ch));
        }
    }
    out
}

/// `<cache dir>/<command>.log`, creating the cache directory on demand.
///
/// `None` when no cache directory can be resolved or created; file logging
/// is then silently disabled.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = crate::config::default_cache_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}
