//! CLI configuration stored in `$XDG_CONFIG_HOME/dotforge/config.toml`.
pub mod keys;
pub mod toml_loader;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub use keys::ConfigKey;

/// Application directory name under the XDG base directories.
const APP_DIR: &str = "dotforge";

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Output format for command results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// `[repository]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    /// Template repository URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Branch to track.
    pub branch: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            url: None,
            branch: "main".to_string(),
        }
    }
}

/// `[behavior]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorSettings {
    /// Sync the repository before commands that read templates.
    pub auto_sync: bool,
    /// Ask before running a template's install script.
    pub prompt_for_scripts: bool,
    /// Format used when `--format` is not given.
    pub default_format: OutputFormat,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            auto_sync: true,
            prompt_for_scripts: true,
            default_format: OutputFormat::Text,
        }
    }
}

/// `[paths]` section; unset entries fall back to the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Home directory used as the dotfiles link base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    /// Directory holding the repository cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,
}

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Repository settings.
    pub repository: RepositorySettings,
    /// Behaviour switches.
    pub behavior: BehaviorSettings,
    /// Path overrides.
    pub paths: PathSettings,
}

impl Config {
    /// Load and validate the config at `path`.  A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// invalid repository URL or branch.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml_loader::load_config(path)?;
        if let Some(url) = &config.repository.url {
            config.repository.url = Some(validation::validate_repo_url(url)?);
        }
        config.repository.branch = validation::validate_branch(&config.repository.branch)?;
        Ok(config)
    }

    /// Write the config to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        toml_loader::save_config(path, self)
    }

    /// Default config file location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHome`] if no base directory can be found.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(default_config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// `true` once a repository URL is set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.repository.url.is_some()
    }

    /// The configured repository URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] if no URL is set.
    pub fn repo_url(&self) -> Result<&str, ConfigError> {
        self.repository
            .url
            .as_deref()
            .ok_or(ConfigError::NotConfigured)
    }

    /// Directory holding cached repositories and other state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHome`] if it is not configured and cannot be derived.
    pub fn config_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.paths.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_config_dir(),
        }
    }

    /// Home directory used for dotfiles links.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHome`] if it is not configured and `HOME` is unset.
    pub fn home_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.paths.home {
            Some(home) => Ok(home.clone()),
            None => crate::tasks::home_dir(),
        }
    }

    /// Local clone location for `url`: `<config_dir>/repos/<safe name>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHome`] if the config directory cannot be derived.
    pub fn repo_cache_dir(&self, url: &str) -> Result<PathBuf, ConfigError> {
        Ok(self.config_dir()?.join("repos").join(safe_repo_name(url)))
    }

    /// Read the value of `key` as display text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHome`] for derived paths that cannot be resolved.
    pub fn get(&self, key: ConfigKey) -> Result<String, ConfigError> {
        Ok(match key {
            ConfigKey::RepositoryUrl => self
                .repository
                .url
                .clone()
                .unwrap_or_else(|| "Not set".to_string()),
            ConfigKey::RepositoryBranch => self.repository.branch.clone(),
            ConfigKey::AutoSync => self.behavior.auto_sync.to_string(),
            ConfigKey::PromptForScripts => self.behavior.prompt_for_scripts.to_string(),
            ConfigKey::DefaultFormat => self.behavior.default_format.to_string(),
            ConfigKey::ConfigDir => self.config_dir()?.display().to_string(),
            ConfigKey::UserHome => self.home_dir()?.display().to_string(),
        })
    }

    /// Validate and store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for rejected values and
    /// [`ConfigError::UnknownKey`] for read-only keys.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        match key {
            ConfigKey::RepositoryUrl => {
                self.repository.url = Some(validation::validate_repo_url(value)?);
            }
            ConfigKey::RepositoryBranch => {
                self.repository.branch = validation::validate_branch(value)?;
            }
            ConfigKey::AutoSync => {
                self.behavior.auto_sync = validation::parse_bool(key.as_str(), value)?;
            }
            ConfigKey::PromptForScripts => {
                self.behavior.prompt_for_scripts = validation::parse_bool(key.as_str(), value)?;
            }
            ConfigKey::DefaultFormat => {
                self.behavior.default_format =
                    <OutputFormat as clap::ValueEnum>::from_str(value.trim(), true).map_err(
                        |_| ConfigError::InvalidValue {
                            key: key.as_str().to_string(),
                            reason: format!("expected text or json, got '{value}'"),
                        },
                    )?;
            }
            ConfigKey::ConfigDir | ConfigKey::UserHome => return Err(key.read_only_error()),
        }
        Ok(())
    }

    /// Restore `key` to its default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for read-only keys.
    pub fn unset(&mut self, key: ConfigKey) -> Result<(), ConfigError> {
        let defaults = Self::default();
        match key {
            ConfigKey::RepositoryUrl => self.repository.url = None,
            ConfigKey::RepositoryBranch => self.repository.branch = defaults.repository.branch,
            ConfigKey::AutoSync => self.behavior.auto_sync = defaults.behavior.auto_sync,
            ConfigKey::PromptForScripts => {
                self.behavior.prompt_for_scripts = defaults.behavior.prompt_for_scripts;
            }
            ConfigKey::DefaultFormat => {
                self.behavior.default_format = defaults.behavior.default_format;
            }
            ConfigKey::ConfigDir | ConfigKey::UserHome => return Err(key.read_only_error()),
        }
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/dotforge`, falling back to `~/.config/dotforge`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHome`] if neither variable is usable.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    xdg_app_dir("XDG_CONFIG_HOME", ".config")
}

/// `$XDG_CACHE_HOME/dotforge`, falling back to `~/.cache/dotforge`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHome`] if neither variable is usable.
pub fn default_cache_dir() -> Result<PathBuf, ConfigError> {
    xdg_app_dir("XDG_CACHE_HOME", ".cache")
}

fn xdg_app_dir(var: &str, home_fallback: &str) -> Result<PathBuf, ConfigError> {
    let base = match std::env::var_os(var) {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => crate::tasks::home_dir()?.join(home_fallback),
    };
    Ok(base.join(APP_DIR))
}

/// Directory name for a repository URL with separators flattened to `_`.
#[must_use]
pub fn safe_repo_name(url: &str) -> String {
    url.replace("://", "_")
        .replace(['/', '.', ':', '@'], "_")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    // ---- loading ----

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.repository.branch, "main");
        assert!(config.behavior.auto_sync);
        assert!(config.behavior.prompt_for_scripts);
        assert!(!config.is_configured());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "[repository]\nurl = \"https://example.com/t.git\"\n\n[behavior]\ndefault_format = \"json\"\n",
        );

        let config = Config::load(&path).unwrap();

        assert_eq!(config.repo_url().unwrap(), "https://example.com/t.git");
        assert_eq!(config.repository.branch, "main");
        assert_eq!(config.behavior.default_format, OutputFormat::Json);
        assert!(config.behavior.auto_sync);
    }

    #[test]
    fn invalid_url_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "[repository]\nurl = \"ftp://nope\"\n");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unknown_section_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "[mystery]\nx = 1\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn save_roundtrip_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/config.toml");
        let mut config = Config::default();
        config
            .set(ConfigKey::RepositoryUrl, "git@github.com:acme/t.git")
            .unwrap();
        config.set(ConfigKey::AutoSync, "false").unwrap();

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    // ---- keys ----

    #[test]
    fn set_validates_values() {
        let mut config = Config::default();
        assert!(config.set(ConfigKey::RepositoryBranch, "bad branch").is_err());
        assert!(config.set(ConfigKey::DefaultFormat, "yaml").is_err());
        config.set(ConfigKey::DefaultFormat, "JSON").unwrap();
        assert_eq!(config.behavior.default_format, OutputFormat::Json);
    }

    #[test]
    fn derived_keys_are_read_only() {
        let mut config = Config::default();
        assert!(matches!(
            config.set(ConfigKey::ConfigDir, "/x"),
            Err(ConfigError::UnknownKey { .. })
        ));
        assert!(config.unset(ConfigKey::UserHome).is_err());
    }

    #[test]
    fn unset_restores_defaults() {
        let mut config = Config::default();
        config.set(ConfigKey::RepositoryUrl, "https://e.com/r").unwrap();
        config.set(ConfigKey::RepositoryBranch, "dev").unwrap();

        config.unset(ConfigKey::RepositoryUrl).unwrap();
        config.unset(ConfigKey::RepositoryBranch).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.get(ConfigKey::RepositoryUrl).unwrap(), "Not set");
    }

    #[test]
    fn get_reads_configured_paths() {
        let config = Config {
            paths: PathSettings {
                home: Some(PathBuf::from("/home/someone")),
                config_dir: Some(PathBuf::from("/etc/df")),
            },
            ..Config::default()
        };
        assert_eq!(config.get(ConfigKey::UserHome).unwrap(), "/home/someone");
        assert_eq!(config.get(ConfigKey::ConfigDir).unwrap(), "/etc/df");
    }

    // ---- paths ----

    #[test]
    fn safe_repo_name_flattens_separators() {
        assert_eq!(
            safe_repo_name("https://github.com/acme/templates.git"),
            "https_github_com_acme_templates_git"
        );
        assert_eq!(
            safe_repo_name("git@github.com:acme/t.git"),
            "git_github_com_acme_t_git"
        );
    }

    #[test]
    fn repo_cache_dir_lives_under_config_dir() {
        let config = Config {
            paths: PathSettings {
                home: None,
                config_dir: Some(PathBuf::from("/cfg")),
            },
            ..Config::default()
        };
        assert_eq!(
            config.repo_cache_dir("https://e.com/r").unwrap(),
            PathBuf::from("/cfg/repos/https_e_com_r")
        );
    }

    #[test]
    fn not_configured_without_url() {
        assert!(matches!(
            Config::default().repo_url(),
            Err(ConfigError::NotConfigured)
        ));
    }
}
