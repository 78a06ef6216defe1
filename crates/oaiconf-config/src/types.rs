//! Configuration input types: auth modes, overrides, and the TOML file schema.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

// ─────────────────────────────────────────────────────────────────────────────
// Auth mode
// ─────────────────────────────────────────────────────────────────────────────

/// How requests to the model API are authenticated.
///
/// Exactly one mode is active for the lifetime of a resolved config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AuthMode {
    /// OpenAI endpoint with an API key.
    #[serde(rename = "use_openai_api_key")]
    OpenAiApiKey,
    /// Azure OpenAI deployment with an API key.
    #[default]
    #[serde(rename = "use_azure_openai_api_key")]
    AzureApiKey,
    /// Azure OpenAI deployment with an Entra ID bearer token.
    #[serde(rename = "use_azure_managed_identity")]
    AzureManagedIdentity,
}

impl AuthMode {
    /// Selector value as written in `OPENAI_AUTH_TYPE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::OpenAiApiKey => "use_openai_api_key",
            AuthMode::AzureApiKey => "use_azure_openai_api_key",
            AuthMode::AzureManagedIdentity => "use_azure_managed_identity",
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "use_openai_api_key" => Ok(AuthMode::OpenAiApiKey),
            "use_azure_openai_api_key" => Ok(AuthMode::AzureApiKey),
            "use_azure_managed_identity" => Ok(AuthMode::AzureManagedIdentity),
            other => Err(ConfigError::UnknownAuthMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Where the active auth mode came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSource {
    /// `OPENAI_AUTH_TYPE` environment variable.
    Env,
    /// `auth_type` in the config file.
    ConfigFile,
    /// Nothing set; built-in default.
    Default,
}

impl std::fmt::Display for ModeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModeSource::Env => write!(f, "env var {}", crate::env::AUTH_TYPE),
            ModeSource::ConfigFile => write!(f, "config file"),
            ModeSource::Default => write!(f, "default"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Overrides
// ─────────────────────────────────────────────────────────────────────────────

/// Explicit values that take precedence over the environment in Azure modes.
///
/// Direct OpenAI mode reads only the environment and ignores these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub endpoint_url: Option<String>,
    pub model_name: Option<String>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config file
// ─────────────────────────────────────────────────────────────────────────────

/// TOML config file, the lowest-precedence layer for Azure modes.
///
/// ```toml
/// auth_type = "use_azure_managed_identity"
/// api_version = "2024-06-01"
/// endpoint = "https://my-resource.openai.azure.com/"
/// deployment = "gpt-4o"
/// tenant_id = "contoso.onmicrosoft.com"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Auth mode selector, used when `OPENAI_AUTH_TYPE` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,

    /// Azure OpenAI API key (plaintext; prefer the environment).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Azure OpenAI endpoint base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Azure OpenAI deployment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,

    /// Entra tenant for managed-identity login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// Client id for managed-identity login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl FileConfig {
    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Whether the file holds a plaintext API key.
    pub fn has_plaintext_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestration hyperparameters
// ─────────────────────────────────────────────────────────────────────────────

/// Hyperparameters added by the custom orchestrator config.
///
/// `None` is emitted as `null`, which the orchestrator treats as "unset".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorParams {
    pub seed: Option<i64>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
    pub timeout: Option<u64>,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            seed: Some(47),
            temperature: Some(0.5),
            max_tokens: Some(-1),
            timeout: Some(6000),
        }
    }
}

impl OrchestratorParams {
    pub fn with_seed(mut self, seed: Option<i64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<i64>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }
}
