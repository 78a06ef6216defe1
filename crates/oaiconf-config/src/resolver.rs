//! Credential resolution — turns environment, overrides, and the config file
//! into a concrete [`OaiConfig`] and shapes it for consumers.
//!
//! Precedence for Azure modes (first non-empty wins):
//! 1. Explicit override
//! 2. Environment variable
//! 3. Config file
//!
//! Direct OpenAI mode reads the environment only.

use oaiconf_identity::{
    IdentityConfig, InteractiveBrowserCredential, StaticTokenProvider, TokenProviderRef,
    create_token_cache,
};

use crate::discovery::{load_config_file, xdg_config_dir};
use crate::env::{self, EnvSource, ProcessEnv, layered};
use crate::output::{
    AZURE_API_TYPE, AzureArgs, AzureAuth, CustomOrchestratorConfig, OrchestratorConfig,
    OrchestratorEntry, ProviderConfig,
};
use crate::{
    AuthMode, ConfigError, ConfigOverrides, FileConfig, ModeSource, OrchestratorParams, Result,
};

/// Credentials for the active auth mode.
///
/// Absent values stay `None`; nothing is validated at resolution time.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedCredentials {
    OpenAi {
        api_key: Option<String>,
        model: Option<String>,
        api_version: Option<String>,
    },
    AzureApiKey {
        api_version: Option<String>,
        api_key: Option<String>,
        endpoint: Option<String>,
        deployment: Option<String>,
    },
    AzureManagedIdentity {
        api_version: Option<String>,
        token_provider: TokenProviderRef,
        endpoint: Option<String>,
        deployment: Option<String>,
    },
}

impl ResolvedCredentials {
    pub fn mode(&self) -> AuthMode {
        match self {
            ResolvedCredentials::OpenAi { .. } => AuthMode::OpenAiApiKey,
            ResolvedCredentials::AzureApiKey { .. } => AuthMode::AzureApiKey,
            ResolvedCredentials::AzureManagedIdentity { .. } => AuthMode::AzureManagedIdentity,
        }
    }
}

/// Resolved model API configuration.
///
/// Immutable after construction; the auth mode never changes.
#[derive(Debug, Clone)]
pub struct OaiConfig {
    mode_source: ModeSource,
    credentials: ResolvedCredentials,
}

impl OaiConfig {
    /// Resolve from the process environment.
    pub fn from_env(overrides: &ConfigOverrides) -> Result<Self> {
        Self::resolve(overrides, &ProcessEnv)
    }

    /// Resolve from an arbitrary environment source.
    ///
    /// In managed-identity mode a token provider is built from the
    /// environment; see [`default_token_provider`].
    pub fn resolve(overrides: &ConfigOverrides, env: &dyn EnvSource) -> Result<Self> {
        Self::build(overrides, env, None)
    }

    /// Resolve, supplying the token provider used in managed-identity mode.
    pub fn resolve_with_provider(
        overrides: &ConfigOverrides,
        env: &dyn EnvSource,
        token_provider: TokenProviderRef,
    ) -> Result<Self> {
        Self::build(overrides, env, Some(token_provider))
    }

    fn build(
        overrides: &ConfigOverrides,
        env: &dyn EnvSource,
        token_provider: Option<TokenProviderRef>,
    ) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => load_config_file(path)?,
            None => FileConfig::default(),
        };

        let (mode, mode_source) = select_mode(env, &file)?;
        tracing::debug!(mode = %mode, source = %mode_source, "Resolved auth mode");

        let api_version = || {
            layered(
                overrides.api_version.as_deref(),
                env,
                env::OPENAI_API_VERSION,
                file.api_version.as_deref(),
            )
        };
        let endpoint = || {
            layered(
                overrides.endpoint_url.as_deref(),
                env,
                env::AZURE_OPENAI_API_BASE,
                file.endpoint.as_deref(),
            )
        };
        let deployment = || {
            layered(
                overrides.model_name.as_deref(),
                env,
                env::AZURE_OPENAI_API_DEPLOY,
                file.deployment.as_deref(),
            )
        };

        let credentials = match mode {
            AuthMode::OpenAiApiKey => ResolvedCredentials::OpenAi {
                api_key: env.var(env::OPENAI_API_KEY),
                model: env.var(env::OPENAI_API_MODEL),
                api_version: env.var(env::OPENAI_API_VERSION),
            },
            AuthMode::AzureApiKey => ResolvedCredentials::AzureApiKey {
                api_version: api_version(),
                api_key: layered(
                    overrides.api_key.as_deref(),
                    env,
                    env::AZURE_OPENAI_API_KEY,
                    file.api_key.as_deref(),
                ),
                endpoint: endpoint(),
                deployment: deployment(),
            },
            AuthMode::AzureManagedIdentity => ResolvedCredentials::AzureManagedIdentity {
                api_version: api_version(),
                token_provider: token_provider
                    .unwrap_or_else(|| default_token_provider(env, &file)),
                endpoint: endpoint(),
                deployment: deployment(),
            },
        };

        Ok(Self {
            mode_source,
            credentials,
        })
    }

    /// The active auth mode.
    pub fn auth_mode(&self) -> AuthMode {
        self.credentials.mode()
    }

    /// Where the auth mode was selected from.
    pub fn mode_source(&self) -> ModeSource {
        self.mode_source
    }

    pub fn credentials(&self) -> &ResolvedCredentials {
        &self.credentials
    }

    /// The bearer token provider, in managed-identity mode.
    pub fn token_provider(&self) -> Option<&TokenProviderRef> {
        match &self.credentials {
            ResolvedCredentials::AzureManagedIdentity { token_provider, .. } => {
                Some(token_provider)
            }
            _ => None,
        }
    }

    /// Provider-agnostic config tagged `oai` or `aoai`.
    pub fn get_config(&self) -> ProviderConfig {
        match &self.credentials {
            ResolvedCredentials::OpenAi {
                api_key,
                model,
                api_version,
            } => ProviderConfig::OpenAi {
                model: model.clone(),
                api_key: api_key.clone(),
                api_version: api_version.clone(),
            },
            ResolvedCredentials::AzureApiKey {
                api_version,
                endpoint,
                deployment,
                ..
            }
            | ResolvedCredentials::AzureManagedIdentity {
                api_version,
                endpoint,
                deployment,
                ..
            } => ProviderConfig::Azure {
                aoai_args: AzureArgs {
                    azure_endpoint: endpoint.clone(),
                    api_version: api_version.clone(),
                    auth: self.azure_auth(),
                },
                model: deployment.clone(),
            },
        }
    }

    /// AutoGen `llm_config` for this mode.
    pub fn get_default_orchestrator_config(&self) -> OrchestratorConfig {
        match &self.credentials {
            ResolvedCredentials::OpenAi { model, .. } => OrchestratorConfig::OpenAi {
                model: model.clone(),
            },
            ResolvedCredentials::AzureApiKey {
                api_version,
                endpoint,
                deployment,
                ..
            }
            | ResolvedCredentials::AzureManagedIdentity {
                api_version,
                endpoint,
                deployment,
                ..
            } => OrchestratorConfig::Azure {
                config_list: vec![OrchestratorEntry {
                    api_type: AZURE_API_TYPE.to_string(),
                    api_version: api_version.clone(),
                    base_url: endpoint.clone(),
                    model: deployment.clone(),
                    auth: self.azure_auth(),
                }],
                cache_seed: None,
            },
        }
    }

    /// AutoGen `llm_config` with hyperparameters.
    ///
    /// Direct OpenAI mode has no `config_list` and yields
    /// [`ConfigError::NoConfigList`].
    pub fn get_custom_orchestrator_config(
        &self,
        params: OrchestratorParams,
    ) -> Result<CustomOrchestratorConfig> {
        let config_list = self
            .get_default_orchestrator_config()
            .into_config_list()
            .ok_or(ConfigError::NoConfigList {
                mode: self.auth_mode(),
            })?;

        Ok(CustomOrchestratorConfig {
            config_list,
            seed: params.seed,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            timeout: params.timeout,
            cache_seed: None,
        })
    }

    /// Check that every value the active mode needs is present.
    ///
    /// Resolution itself never fails on missing values; call this when a
    /// hard failure is preferable to sending incomplete credentials.
    pub fn validate(&self) -> Result<()> {
        let mode = self.auth_mode();
        let required: Vec<(&str, &str, bool)> = match &self.credentials {
            ResolvedCredentials::OpenAi { api_key, model, .. } => vec![
                ("api_key", env::OPENAI_API_KEY, api_key.is_some()),
                ("model", env::OPENAI_API_MODEL, model.is_some()),
            ],
            ResolvedCredentials::AzureApiKey {
                api_version,
                api_key,
                endpoint,
                deployment,
            } => vec![
                ("api_key", env::AZURE_OPENAI_API_KEY, api_key.is_some()),
                ("endpoint", env::AZURE_OPENAI_API_BASE, endpoint.is_some()),
                ("deployment", env::AZURE_OPENAI_API_DEPLOY, deployment.is_some()),
                ("api_version", env::OPENAI_API_VERSION, api_version.is_some()),
            ],
            ResolvedCredentials::AzureManagedIdentity {
                api_version,
                endpoint,
                deployment,
                ..
            } => vec![
                ("endpoint", env::AZURE_OPENAI_API_BASE, endpoint.is_some()),
                ("deployment", env::AZURE_OPENAI_API_DEPLOY, deployment.is_some()),
                ("api_version", env::OPENAI_API_VERSION, api_version.is_some()),
            ],
        };

        match required.into_iter().find(|(_, _, present)| !present) {
            Some((field, env_var, _)) => Err(ConfigError::MissingField {
                field: field.to_string(),
                mode,
                env_var: env_var.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn azure_auth(&self) -> AzureAuth {
        match &self.credentials {
            ResolvedCredentials::AzureManagedIdentity { token_provider, .. } => {
                AzureAuth::TokenProvider {
                    azure_ad_token_provider: token_provider.clone(),
                }
            }
            ResolvedCredentials::AzureApiKey { api_key, .. } => AzureAuth::ApiKey {
                api_key: api_key.clone(),
            },
            ResolvedCredentials::OpenAi { api_key, .. } => AzureAuth::ApiKey {
                api_key: api_key.clone(),
            },
        }
    }
}

/// Pick the auth mode: env var, then config file, then the default.
fn select_mode(env: &dyn EnvSource, file: &FileConfig) -> Result<(AuthMode, ModeSource)> {
    if let Some(value) = env.var(env::AUTH_TYPE) {
        return Ok((value.parse()?, ModeSource::Env));
    }
    if let Some(value) = file.auth_type.as_deref().filter(|v| !v.trim().is_empty()) {
        return Ok((value.parse()?, ModeSource::ConfigFile));
    }
    Ok((AuthMode::default(), ModeSource::Default))
}

/// Token provider for managed-identity mode.
///
/// A pre-fetched `AZURE_OPENAI_AD_TOKEN` wins; otherwise an interactive
/// browser credential for the Cognitive Services scope, caching tokens in the
/// config directory. Building the provider does not log in.
pub fn default_token_provider(env: &dyn EnvSource, file: &FileConfig) -> TokenProviderRef {
    if let Some(token) = env.var(env::AZURE_OPENAI_AD_TOKEN) {
        tracing::debug!("Using pre-fetched token from {}", env::AZURE_OPENAI_AD_TOKEN);
        return TokenProviderRef::new(StaticTokenProvider::new(token));
    }

    TokenProviderRef::new(interactive_credential(env, file))
}

/// Interactive browser credential configured from the environment and file.
///
/// Tenant and client id come from `AZURE_TENANT_ID` / `AZURE_CLIENT_ID`,
/// falling back to the config file; tokens are cached in the config directory.
pub fn interactive_credential(
    env: &dyn EnvSource,
    file: &FileConfig,
) -> InteractiveBrowserCredential {
    let mut identity = IdentityConfig::cognitive_services();
    if let Some(tenant) = layered(None, env, env::AZURE_TENANT_ID, file.tenant_id.as_deref()) {
        identity = identity.with_tenant(tenant);
    }
    if let Some(client_id) = layered(None, env, env::AZURE_CLIENT_ID, file.client_id.as_deref()) {
        identity = identity.with_client_id(client_id);
    }

    match xdg_config_dir() {
        Some(dir) => {
            let cache = create_token_cache(&dir, &identity);
            InteractiveBrowserCredential::new(identity, cache)
        }
        None => InteractiveBrowserCredential::in_memory(identity),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn azure_env(mode: &'static str) -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("OPENAI_AUTH_TYPE", mode),
            ("OPENAI_API_VERSION", "2024-06-01"),
            ("AZURE_OPENAI_API_KEY", "env-key"),
            ("AZURE_OPENAI_API_BASE", "https://env.openai.azure.com/"),
            ("AZURE_OPENAI_API_DEPLOY", "env-deploy"),
        ])
    }

    fn static_provider() -> TokenProviderRef {
        TokenProviderRef::new(StaticTokenProvider::new("aad-token"))
    }

    #[test]
    fn test_default_mode_is_azure_api_key() {
        let env: HashMap<&str, &str> = HashMap::new();
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();
        assert_eq!(config.auth_mode(), AuthMode::AzureApiKey);
        assert_eq!(config.mode_source(), ModeSource::Default);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let env = HashMap::from([("OPENAI_AUTH_TYPE", "use_something_else")]);
        let err = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAuthMode { .. }));
    }

    #[test]
    fn test_openai_mode_reads_env() {
        let env = HashMap::from([
            ("OPENAI_AUTH_TYPE", "use_openai_api_key"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_MODEL", "gpt-4o"),
            ("OPENAI_API_VERSION", "2024-06-01"),
        ]);
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();

        assert_eq!(config.auth_mode(), AuthMode::OpenAiApiKey);
        assert_eq!(config.mode_source(), ModeSource::Env);
        assert_eq!(
            serde_json::to_value(config.get_config()).unwrap(),
            json!({
                "type": "oai",
                "model": "gpt-4o",
                "api_key": "sk-test",
                "api_version": "2024-06-01"
            })
        );
        assert_eq!(
            serde_json::to_value(config.get_default_orchestrator_config()).unwrap(),
            json!({"model": "gpt-4o"})
        );
        assert!(config.token_provider().is_none());
    }

    #[test]
    fn test_openai_mode_ignores_overrides() {
        let env = HashMap::from([
            ("OPENAI_AUTH_TYPE", "use_openai_api_key"),
            ("OPENAI_API_KEY", "sk-env"),
            ("OPENAI_API_MODEL", "gpt-env"),
        ]);
        let overrides = ConfigOverrides::new()
            .with_api_key("sk-override")
            .with_model_name("gpt-override")
            .with_api_version("override-version");
        let config = OaiConfig::resolve(&overrides, &env).unwrap();

        assert_eq!(
            config.credentials(),
            &ResolvedCredentials::OpenAi {
                api_key: Some("sk-env".to_string()),
                model: Some("gpt-env".to_string()),
                api_version: None,
            }
        );
    }

    #[test]
    fn test_azure_key_mode_from_env() {
        let env = azure_env("use_azure_openai_api_key");
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();

        assert_eq!(
            serde_json::to_value(config.get_config()).unwrap(),
            json!({
                "type": "aoai",
                "aoai_args": {
                    "azure_endpoint": "https://env.openai.azure.com/",
                    "api_version": "2024-06-01",
                    "api_key": "env-key"
                },
                "model": "env-deploy"
            })
        );
        assert_eq!(
            serde_json::to_value(config.get_default_orchestrator_config()).unwrap(),
            json!({
                "config_list": [{
                    "api_type": "azure",
                    "api_version": "2024-06-01",
                    "base_url": "https://env.openai.azure.com/",
                    "model": "env-deploy",
                    "api_key": "env-key"
                }],
                "cache_seed": null
            })
        );
    }

    #[test]
    fn test_azure_key_mode_overrides_win() {
        let env = azure_env("use_azure_openai_api_key");
        let overrides = ConfigOverrides::new()
            .with_api_key("override-key")
            .with_endpoint_url("https://override.openai.azure.com/")
            .with_model_name("override-deploy")
            .with_api_version("2025-01-01");
        let config = OaiConfig::resolve(&overrides, &env).unwrap();

        assert_eq!(
            config.credentials(),
            &ResolvedCredentials::AzureApiKey {
                api_version: Some("2025-01-01".to_string()),
                api_key: Some("override-key".to_string()),
                endpoint: Some("https://override.openai.azure.com/".to_string()),
                deployment: Some("override-deploy".to_string()),
            }
        );
    }

    #[test]
    fn test_azure_key_mode_missing_values_pass_through() {
        let env = HashMap::from([("OPENAI_AUTH_TYPE", "use_azure_openai_api_key")]);
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();
        let value = serde_json::to_value(config.get_config()).unwrap();
        assert_eq!(value["aoai_args"]["api_key"], json!(null));
        assert_eq!(value["model"], json!(null));
    }

    #[test]
    fn test_managed_identity_uses_token_provider() {
        let env = azure_env("use_azure_managed_identity");
        let provider = static_provider();
        let config =
            OaiConfig::resolve_with_provider(&ConfigOverrides::new(), &env, provider.clone())
                .unwrap();

        assert_eq!(config.auth_mode(), AuthMode::AzureManagedIdentity);
        assert_eq!(config.token_provider(), Some(&provider));

        let value = serde_json::to_value(config.get_config()).unwrap();
        assert_eq!(value["type"], json!("aoai"));
        assert_eq!(value["aoai_args"]["azure_ad_token_provider"], json!("static"));
        assert!(value["aoai_args"].get("api_key").is_none());

        let orchestrator = config.get_default_orchestrator_config();
        let entry = &orchestrator.config_list().unwrap()[0];
        assert_eq!(entry.auth.token_provider(), Some(&provider));
        assert_eq!(entry.auth.api_key(), None);
        assert_eq!(entry.model.as_deref(), Some("env-deploy"));
    }

    #[test]
    fn test_managed_identity_ignores_api_key_override() {
        let env = azure_env("use_azure_managed_identity");
        let overrides = ConfigOverrides::new().with_api_key("should-not-appear");
        let config =
            OaiConfig::resolve_with_provider(&overrides, &env, static_provider()).unwrap();
        let value = serde_json::to_value(config.get_default_orchestrator_config()).unwrap();
        assert!(!value.to_string().contains("should-not-appear"));
    }

    #[tokio::test]
    async fn test_managed_identity_prefetched_token() {
        let mut env: HashMap<&str, &str> = azure_env("use_azure_managed_identity");
        env.insert("AZURE_OPENAI_AD_TOKEN", "prefetched");
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();

        let token = config.token_provider().unwrap().get_token().await.unwrap();
        assert_eq!(token.token, "prefetched");
    }

    #[test]
    fn test_default_token_provider_is_interactive() {
        let env = HashMap::from([("AZURE_TENANT_ID", "contoso")]);
        let provider = default_token_provider(&env, &FileConfig::default());
        assert_eq!(
            provider.descriptor(),
            "interactive-browser:https://cognitiveservices.azure.com/.default"
        );
    }

    #[test]
    fn test_interactive_credential_tenant_layering() {
        let file = FileConfig {
            tenant_id: Some("file-tenant".to_string()),
            client_id: Some("file-client".to_string()),
            ..Default::default()
        };
        let env = HashMap::from([("AZURE_TENANT_ID", "env-tenant")]);
        let credential = interactive_credential(&env, &file);
        assert_eq!(credential.config().tenant_id, "env-tenant");
        assert_eq!(credential.config().client_id, "file-client");
    }

    #[test]
    fn test_custom_orchestrator_config_defaults() {
        let env = azure_env("use_azure_openai_api_key");
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();
        let custom = config
            .get_custom_orchestrator_config(OrchestratorParams::default())
            .unwrap();

        let value = serde_json::to_value(&custom).unwrap();
        assert_eq!(value["seed"], json!(47));
        assert_eq!(value["temperature"], json!(0.5));
        assert_eq!(value["max_tokens"], json!(-1));
        assert_eq!(value["timeout"], json!(6000));
        assert_eq!(value["cache_seed"], json!(null));
        assert_eq!(value["config_list"][0]["api_key"], json!("env-key"));
    }

    #[test]
    fn test_custom_orchestrator_config_params() {
        let env = azure_env("use_azure_openai_api_key");
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();
        let params = OrchestratorParams::default()
            .with_seed(None)
            .with_temperature(Some(0.0))
            .with_max_tokens(Some(512))
            .with_timeout(Some(30));
        let custom = config.get_custom_orchestrator_config(params).unwrap();

        assert_eq!(custom.seed, None);
        assert_eq!(custom.temperature, Some(0.0));
        assert_eq!(custom.max_tokens, Some(512));
        assert_eq!(custom.timeout, Some(30));
        assert_eq!(custom.config_list.len(), 1);
    }

    #[test]
    fn test_custom_orchestrator_config_openai_mode_errors() {
        let env = HashMap::from([("OPENAI_AUTH_TYPE", "use_openai_api_key")]);
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();
        let err = config
            .get_custom_orchestrator_config(OrchestratorParams::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NoConfigList {
                mode: AuthMode::OpenAiApiKey
            }
        ));
    }

    #[test]
    fn test_config_file_layer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("oaiconf.toml");
        std::fs::write(
            &path,
            r#"
auth_type = "use_azure_openai_api_key"
api_version = "file-version"
endpoint = "https://file.openai.azure.com/"
deployment = "file-deploy"
api_key = "file-key"
"#,
        )
        .unwrap();

        // Env beats file, file fills the gaps
        let env = HashMap::from([("AZURE_OPENAI_API_DEPLOY", "env-deploy")]);
        let overrides = ConfigOverrides::new().with_config_file(&path);
        let config = OaiConfig::resolve(&overrides, &env).unwrap();

        assert_eq!(config.mode_source(), ModeSource::ConfigFile);
        assert_eq!(
            config.credentials(),
            &ResolvedCredentials::AzureApiKey {
                api_version: Some("file-version".to_string()),
                api_key: Some("file-key".to_string()),
                endpoint: Some("https://file.openai.azure.com/".to_string()),
                deployment: Some("env-deploy".to_string()),
            }
        );
    }

    #[test]
    fn test_openai_mode_ignores_config_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("oaiconf.toml");
        std::fs::write(
            &path,
            r#"
auth_type = "use_openai_api_key"
api_version = "file-version"
endpoint = "https://file.openai.azure.com/"
deployment = "file-deploy"
api_key = "file-key"
"#,
        )
        .unwrap();

        let env = HashMap::from([("OPENAI_API_MODEL", "gpt-env")]);
        let overrides = ConfigOverrides::new().with_config_file(&path);
        let config = OaiConfig::resolve(&overrides, &env).unwrap();

        assert_eq!(config.auth_mode(), AuthMode::OpenAiApiKey);
        assert_eq!(config.mode_source(), ModeSource::ConfigFile);
        assert_eq!(
            config.credentials(),
            &ResolvedCredentials::OpenAi {
                api_key: None,
                model: Some("gpt-env".to_string()),
                api_version: None,
            }
        );
        assert_eq!(
            serde_json::to_value(config.get_default_orchestrator_config()).unwrap(),
            json!({"model": "gpt-env"})
        );
    }

    #[test]
    fn test_env_mode_beats_file_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("oaiconf.toml");
        std::fs::write(&path, "auth_type = \"use_azure_managed_identity\"\n").unwrap();

        let env = HashMap::from([("OPENAI_AUTH_TYPE", "use_openai_api_key")]);
        let config =
            OaiConfig::resolve(&ConfigOverrides::new().with_config_file(&path), &env).unwrap();
        assert_eq!(config.auth_mode(), AuthMode::OpenAiApiKey);
        assert_eq!(config.mode_source(), ModeSource::Env);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let dir = TempDir::new().unwrap();
        let env: HashMap<&str, &str> = HashMap::new();
        let overrides = ConfigOverrides::new().with_config_file(dir.path().join("missing.toml"));
        let err = OaiConfig::resolve(&overrides, &env).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let env = HashMap::from([
            ("OPENAI_AUTH_TYPE", "use_azure_openai_api_key"),
            ("AZURE_OPENAI_API_KEY", "k"),
        ]);
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField { ref field, ref env_var, .. }
            if field == "endpoint" && env_var == "AZURE_OPENAI_API_BASE"
        ));
    }

    #[test]
    fn test_validate_complete_config() {
        let env = azure_env("use_azure_openai_api_key");
        let config = OaiConfig::resolve(&ConfigOverrides::new(), &env).unwrap();
        assert!(config.validate().is_ok());
    }
}
