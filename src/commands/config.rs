//! Command: manage the CLI configuration file.
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::{Terminal, config_path};
use crate::cli::{ConfigAction, GlobalOpts};
use crate::config::{Config, ConfigKey, OutputFormat};

/// Run a `config` action against the file named by `--config`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, or the key or
/// value is invalid.
pub fn run(global: &GlobalOpts, action: &ConfigAction, term: &mut Terminal<'_>) -> Result<()> {
    let path = config_path(global)?;
    let config = Config::load(&path)?;
    let format = global.format.unwrap_or(config.behavior.default_format);
    execute(&path, config, action, format, term)
}

/// Apply `action` to `config`, saving to `path` when it changes.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or saving fails.
pub fn execute(
    path: &Path,
    mut config: Config,
    action: &ConfigAction,
    format: OutputFormat,
    term: &mut Terminal<'_>,
) -> Result<()> {
    match action {
        ConfigAction::Show => match format {
            OutputFormat::Text => term.print(&render_show(path, &config)?),
            OutputFormat::Json => term.json(&ShowOutput::new(path, &config)?),
        },
        ConfigAction::List => {
            let values = ConfigKey::ALL
                .into_iter()
                .map(|k| Ok((k.as_str(), config.get(k)?)))
                .collect::<Result<BTreeMap<_, _>>>()?;
            match format {
                OutputFormat::Text => {
                    let mut out = String::new();
                    for key in ConfigKey::ALL {
                        let value = values.get(key.as_str()).map_or("", String::as_str);
                        let _ = writeln!(out, "{key}: {value}");
                    }
                    term.print(&out)
                }
                OutputFormat::Json => term.json(&values),
            }
        }
        ConfigAction::Get { key } => {
            let key: ConfigKey = key.parse()?;
            let value = config.get(key)?;
            match format {
                OutputFormat::Text => term.print(&format!("{key}: {value}\n")),
                OutputFormat::Json => term.json(&BTreeMap::from([(key.as_str(), value)])),
            }
        }
        ConfigAction::Set { key, value } => {
            let key: ConfigKey = key.parse()?;
            config.set(key, value)?;
            config.save(path)?;
            term.print(&format!("✓ Set {key} = {}\n", config.get(key)?))
        }
        ConfigAction::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            config.unset(key)?;
            config.save(path)?;
            term.print(&format!("✓ Reset {key} to default\n"))
        }
        ConfigAction::Reset { confirm } => {
            if !confirm && !term.confirm("Reset all configuration to defaults?")? {
                return term.print("Reset cancelled\n");
            }
            Config::default().save(path)?;
            term.print("✓ Configuration reset to defaults\n")
        }
    }
}

fn render_show(path: &Path, config: &Config) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(out, "Config file: {}", path.display());
    let _ = writeln!(out, "Config directory: {}", config.config_dir()?.display());
    let _ = writeln!(out, "Home directory: {}", config.home_dir()?.display());
    out.push('\n');
    let _ = writeln!(out, "[repository]");
    let _ = writeln!(out, "url = {}", config.get(ConfigKey::RepositoryUrl)?);
    let _ = writeln!(out, "branch = {}", config.repository.branch);
    if let Ok(url) = config.repo_url() {
        let _ = writeln!(out, "cache = {}", config.repo_cache_dir(url)?.display());
    }
    out.push('\n');
    let _ = writeln!(out, "[behavior]");
    let _ = writeln!(out, "auto_sync = {}", config.behavior.auto_sync);
    let _ = writeln!(
        out,
        "prompt_for_scripts = {}",
        config.behavior.prompt_for_scripts
    );
    let _ = writeln!(out, "default_format = {}", config.behavior.default_format);
    Ok(out)
}

/// JSON document printed by `config show --format json`.
#[derive(Debug, Serialize)]
pub struct ShowOutput<'a> {
    /// Config file location.
    pub config_file: &'a Path,
    /// Effective config directory.
    pub config_dir: std::path::PathBuf,
    /// Effective home directory.
    pub home: std::path::PathBuf,
    /// Repository cache location, when a repository is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<std::path::PathBuf>,
    /// The stored settings.
    pub settings: &'a Config,
}

impl<'a> ShowOutput<'a> {
    /// Gather the stored settings and derived paths.
    ///
    /// # Errors
    ///
    /// Returns an error if derived paths cannot be resolved.
    pub fn new(config_file: &'a Path, config: &'a Config) -> Result<Self> {
        let cache_dir = match config.repo_url() {
            Ok(url) => Some(config.repo_cache_dir(url)?),
            Err(_) => None,
        };
        Ok(Self {
            config_file,
            config_dir: config.config_dir()?,
            home: config.home_dir()?,
            cache_dir,
            settings: config,
        })
    }
}
