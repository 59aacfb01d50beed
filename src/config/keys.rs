//! Dotted configuration keys accepted by `dotforge config`.
use std::str::FromStr;

use crate::error::ConfigError;

/// A user-addressable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// `repository.url`
    RepositoryUrl,
    /// `repository.branch`
    RepositoryBranch,
    /// `behavior.auto_sync`
    AutoSync,
    /// `behavior.prompt_for_scripts`
    PromptForScripts,
    /// `behavior.default_format`
    DefaultFormat,
    /// `config.dir` (read-only)
    ConfigDir,
    /// `user.home` (read-only)
    UserHome,
}

impl ConfigKey {
    /// Every key in display order.
    pub const ALL: [Self; 7] = [
        Self::RepositoryUrl,
        Self::RepositoryBranch,
        Self::AutoSync,
        Self::PromptForScripts,
        Self::DefaultFormat,
        Self::ConfigDir,
        Self::UserHome,
    ];

    /// Dotted key name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RepositoryUrl => "repository.url",
            Self::RepositoryBranch => "repository.branch",
            Self::AutoSync => "behavior.auto_sync",
            Self::PromptForScripts => "behavior.prompt_for_scripts",
            Self::DefaultFormat => "behavior.default_format",
            Self::ConfigDir => "config.dir",
            Self::UserHome => "user.home",
        }
    }

    /// `false` for derived keys that can only be read.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::ConfigDir | Self::UserHome)
    }

    pub(super) fn read_only_error(self) -> ConfigError {
        ConfigError::UnknownKey {
            key: format!("{} (read-only)", self.as_str()),
            valid: writable_keys(),
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnknownKey {
                key: s.to_string(),
                valid: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

fn writable_keys() -> String {
    ConfigKey::ALL
        .into_iter()
        .filter(|k| k.is_writable())
        .map(ConfigKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
