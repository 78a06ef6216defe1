//! Configuration error types.

use crate::AuthMode;

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Auth mode selector holds a value that names no mode.
    #[error(
        "unknown auth mode '{value}' (expected use_openai_api_key, use_azure_openai_api_key, or use_azure_managed_identity)"
    )]
    UnknownAuthMode { value: String },

    /// Missing required field (only raised by explicit validation).
    #[error("missing required field '{field}' for {mode} (set {env_var})")]
    MissingField {
        field: String,
        mode: AuthMode,
        env_var: String,
    },

    /// Orchestrator config for this mode has no `config_list` to extend.
    #[error("{mode} produces no config_list; custom orchestrator config needs an Azure mode")]
    NoConfigList { mode: AuthMode },

    /// Failed to load a `.env` file.
    #[error("failed to load .env file: {0}")]
    DotEnv(String),
}
