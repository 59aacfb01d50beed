//! Value checks for repository settings.
use std::path::Path;

use crate::error::ConfigError;

/// URL prefixes accepted for a template repository.
const VALID_URL_PREFIXES: &[&str] = &[
    "http://", "https://", "git://", "ssh://", "git@", "file://",
];

/// Substrings Git forbids in branch names.
const INVALID_BRANCH_SEQUENCES: &[&str] = &[" ", "..", "~", "^", ":", "?", "*", "[", "\\"];

/// Check a repository URL and return it trimmed.
///
/// An existing local directory is accepted as well as the remote prefixes
/// in [`VALID_URL_PREFIXES`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for empty or unsupported URLs.
pub fn validate_repo_url(url: &str) -> Result<String, ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(invalid("repository.url", "cannot be empty"));
    }
    if VALID_URL_PREFIXES.iter().any(|p| url.starts_with(p)) || Path::new(url).is_dir() {
        Ok(url.to_string())
    } else {
        Err(invalid(
            "repository.url",
            format!(
                "must start with one of {} or be a local directory",
                VALID_URL_PREFIXES.join(", ")
            ),
        ))
    }
}

/// Check a branch name and return it trimmed.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the name is empty or not a
/// usable Git branch name.
pub fn validate_branch(branch: &str) -> Result<String, ConfigError> {
    let branch = branch.trim();
    if branch.is_empty() {
        return Err(invalid("repository.branch", "cannot be empty"));
    }
    if let Some(seq) = INVALID_BRANCH_SEQUENCES.iter().find(|s| branch.contains(*s)) {
        return Err(invalid(
            "repository.branch",
            format!("cannot contain '{seq}'"),
        ));
    }
    if branch.starts_with('/') || branch.ends_with('/') || branch.ends_with('.') {
        return Err(invalid(
            "repository.branch",
            "cannot start or end with '/' or end with '.'",
        ));
    }
    Ok(branch.to_string())
}

/// Parse a boolean setting, accepting the usual spellings.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything else.
pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, format!("expected true or false, got '{value}'"))),
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    // ---- repository url ----

    #[test]
    fn accepts_remote_urls() {
        for url in [
            "https://github.com/acme/templates.git",
            "http://example.com/repo",
            "git://example.com/repo",
            "ssh://git@example.com/repo",
            "git@github.com:acme/templates.git",
            "file:///srv/templates",
        ] {
            assert_eq!(validate_repo_url(url).unwrap(), url);
        }
    }

    #[test]
    fn trims_url() {
        assert_eq!(
            validate_repo_url("  https://example.com/r  ").unwrap(),
            "https://example.com/r"
        );
    }

    #[test]
    fn accepts_existing_local_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        assert_eq!(validate_repo_url(&path).unwrap(), path);
    }

    #[test]
    fn rejects_unknown_scheme_and_empty() {
        assert!(validate_repo_url("ftp://example.com/repo").is_err());
        assert!(validate_repo_url("not a url").is_err());
        assert!(matches!(
            validate_repo_url("   "),
            Err(ConfigError::InvalidValue { key, .. }) if key == "repository.url"
        ));
    }

    // ---- branch ----

    #[test]
    fn accepts_ordinary_branches() {
        for b in ["main", "develop", "feature/new-ui", "release-1.2"] {
            assert_eq!(validate_branch(b).unwrap(), b);
        }
    }

    #[test]
    fn rejects_forbidden_sequences() {
        for b in ["has space", "a..b", "a~1", "a^", "a:b", "wh?", "st*r", "br[", "back\\slash"] {
            assert!(validate_branch(b).is_err(), "{b} should be rejected");
        }
    }

    #[test]
    fn rejects_bad_edges() {
        assert!(validate_branch("/main").is_err());
        assert!(validate_branch("main/").is_err());
        assert!(validate_branch("main.").is_err());
        assert!(validate_branch("").is_err());
    }

    // ---- booleans ----

    #[test]
    fn parses_bool_spellings() {
        assert!(parse_bool("k", "Yes").unwrap());
        assert!(!parse_bool("k", "off").unwrap());
        assert!(parse_bool("k", "maybe").is_err());
    }
}
