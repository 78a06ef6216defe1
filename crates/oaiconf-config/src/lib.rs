//! Credential resolution for OpenAI and Azure OpenAI.
//!
//! Selects one of three auth modes from `OPENAI_AUTH_TYPE` and assembles the
//! matching credentials:
//! - `use_openai_api_key` — OpenAI endpoint, API key from the environment
//! - `use_azure_openai_api_key` (default) — Azure deployment with an API key
//! - `use_azure_managed_identity` — Azure deployment with an Entra ID bearer token provider
//!
//! Values come from explicit overrides, then the environment (optionally
//! seeded from a `.env` file), then an optional TOML config file. The result
//! is shaped either as a provider-agnostic config or as an AutoGen
//! `llm_config`.

pub mod discovery;
pub mod env;
pub mod error;
pub mod output;
pub mod resolver;
pub mod types;

pub use discovery::{
    load_config_file, load_dotenv, load_dotenv_from, xdg_config_dir, xdg_config_path,
};
pub use env::{EnvSource, ProcessEnv};
pub use error::{ConfigError, Result};
pub use output::{
    AzureArgs, AzureAuth, CustomOrchestratorConfig, OrchestratorConfig, OrchestratorEntry,
    ProviderConfig,
};
pub use resolver::{
    OaiConfig, ResolvedCredentials, default_token_provider, interactive_credential,
};
pub use types::*;
