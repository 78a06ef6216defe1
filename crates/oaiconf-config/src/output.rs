//! Output shapes.
//!
//! Field names and nesting match what downstream consumers expect; the
//! orchestrator shapes follow AutoGen's `llm_config` schema exactly.

use oaiconf_identity::TokenProviderRef;
use serde::Serialize;

/// `api_type` value for every Azure `config_list` entry.
pub const AZURE_API_TYPE: &str = "azure";

/// How an Azure request authenticates.
///
/// Flattened into its parent, so it contributes either `api_key` or
/// `azure_ad_token_provider`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AzureAuth {
    ApiKey {
        api_key: Option<String>,
    },
    TokenProvider {
        azure_ad_token_provider: TokenProviderRef,
    },
}

impl AzureAuth {
    pub fn api_key(&self) -> Option<&str> {
        match self {
            AzureAuth::ApiKey { api_key } => api_key.as_deref(),
            AzureAuth::TokenProvider { .. } => None,
        }
    }

    pub fn token_provider(&self) -> Option<&TokenProviderRef> {
        match self {
            AzureAuth::ApiKey { .. } => None,
            AzureAuth::TokenProvider {
                azure_ad_token_provider,
            } => Some(azure_ad_token_provider),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider-agnostic config
// ─────────────────────────────────────────────────────────────────────────────

/// Provider-agnostic view of the resolved credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "oai")]
    OpenAi {
        model: Option<String>,
        api_key: Option<String>,
        api_version: Option<String>,
    },
    #[serde(rename = "aoai")]
    Azure {
        aoai_args: AzureArgs,
        model: Option<String>,
    },
}

/// Client construction arguments for Azure OpenAI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AzureArgs {
    pub azure_endpoint: Option<String>,
    pub api_version: Option<String>,
    #[serde(flatten)]
    pub auth: AzureAuth,
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator configs
// ─────────────────────────────────────────────────────────────────────────────

/// AutoGen `llm_config` without hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrchestratorConfig {
    /// Direct OpenAI: only the model; the client reads its key from the environment.
    OpenAi { model: Option<String> },
    /// Azure: a single-entry `config_list` with caching disabled.
    Azure {
        config_list: Vec<OrchestratorEntry>,
        cache_seed: Option<u64>,
    },
}

impl OrchestratorConfig {
    pub fn config_list(&self) -> Option<&[OrchestratorEntry]> {
        match self {
            OrchestratorConfig::OpenAi { .. } => None,
            OrchestratorConfig::Azure { config_list, .. } => Some(config_list),
        }
    }

    pub fn into_config_list(self) -> Option<Vec<OrchestratorEntry>> {
        match self {
            OrchestratorConfig::OpenAi { .. } => None,
            OrchestratorConfig::Azure { config_list, .. } => Some(config_list),
        }
    }
}

/// One `config_list` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestratorEntry {
    pub api_type: String,
    pub api_version: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    #[serde(flatten)]
    pub auth: AzureAuth,
}

/// AutoGen `llm_config` with hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomOrchestratorConfig {
    pub config_list: Vec<OrchestratorEntry>,
    pub seed: Option<i64>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
    pub timeout: Option<u64>,
    pub cache_seed: Option<u64>,
}
