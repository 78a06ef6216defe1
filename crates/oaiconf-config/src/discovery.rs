//! Config file and `.env` discovery.

use std::path::{Path, PathBuf};

use crate::{ConfigError, FileConfig, Result};

/// Application name for XDG directory resolution.
const APP_NAME: &str = "oaiconf";

/// Default config filename within the XDG config directory.
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Get the XDG config directory for oaiconf.
///
/// Checks `OAICONF_CONFIG_DIR` env var first, then falls back to platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(crate::env::CONFIG_DIR)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Path of the user config file, if a config directory can be determined.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Load and parse a TOML config file.
pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let config = FileConfig::from_toml(&content)?;

    if config.has_plaintext_api_key() {
        tracing::warn!(
            path = %path.display(),
            "Config file contains a plaintext api_key; prefer AZURE_OPENAI_API_KEY"
        );
    }
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Load the nearest `.env` file (current directory, then ancestors) into the
/// process environment. Variables that are already set are not overridden.
///
/// Returns the path that was loaded, or `None` if no `.env` file exists.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env");
            Ok(Some(path))
        }
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(ConfigError::DotEnv(e.to_string())),
    }
}

/// Load a specific `.env` file into the process environment.
pub fn load_dotenv_from(path: &Path) -> Result<PathBuf> {
    dotenvy::from_path(path)
        .map_err(|e| ConfigError::DotEnv(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "Loaded .env");
    Ok(path.to_path_buf())
}
