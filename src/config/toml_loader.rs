//! TOML file loading and saving.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Load a TOML document into `T`.
///
/// A missing or blank file deserializes from empty TOML, so `T` should carry
/// `#[serde(default)]` on every field that may be omitted.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not valid TOML for `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Write `value` to `path` as TOML, creating parent directories.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if `value` has no TOML form and
/// [`ConfigError::Io`] if the file cannot be written.
pub fn save_config<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let content =
        toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))?;
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)
}
