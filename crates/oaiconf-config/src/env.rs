//! Environment variable access.
//!
//! Resolution reads through [`EnvSource`] so callers can substitute a map for
//! the process environment.

use std::collections::HashMap;

/// Auth mode selector.
pub const AUTH_TYPE: &str = "OPENAI_AUTH_TYPE";

/// OpenAI API key (direct mode).
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// OpenAI model name (direct mode).
pub const OPENAI_API_MODEL: &str = "OPENAI_API_MODEL";
/// API version, shared by all modes.
pub const OPENAI_API_VERSION: &str = "OPENAI_API_VERSION";

/// Azure OpenAI API key.
pub const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";
/// Azure OpenAI endpoint base URL.
pub const AZURE_OPENAI_API_BASE: &str = "AZURE_OPENAI_API_BASE";
/// Azure OpenAI deployment name.
pub const AZURE_OPENAI_API_DEPLOY: &str = "AZURE_OPENAI_API_DEPLOY";

/// Entra tenant for the interactive login.
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
/// Client id for the interactive login.
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
/// Pre-fetched bearer token; bypasses the interactive login when set.
pub const AZURE_OPENAI_AD_TOKEN: &str = "AZURE_OPENAI_AD_TOKEN";

/// Overrides the config directory.
pub const CONFIG_DIR: &str = "OAICONF_CONFIG_DIR";

/// A source of environment variables.
///
/// Implementations return trimmed values and treat empty values as unset.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().and_then(normalize)
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned().and_then(normalize)
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string()).and_then(normalize)
    }
}

fn normalize(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// First non-empty value among an explicit override, an env var, and a fallback.
pub(crate) fn layered(
    explicit: Option<&str>,
    env: &dyn EnvSource,
    key: &str,
    fallback: Option<&str>,
) -> Option<String> {
    explicit
        .map(str::to_string)
        .and_then(normalize)
        .or_else(|| env.var(key))
        .or_else(|| fallback.map(str::to_string).and_then(normalize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source_trims_and_filters() {
        let env = HashMap::from([("A", "  x  "), ("B", "   "), ("C", "")]);
        assert_eq!(env.var("A").as_deref(), Some("x"));
        assert_eq!(env.var("B"), None);
        assert_eq!(env.var("C"), None);
        assert_eq!(env.var("D"), None);
    }

    #[test]
    fn test_layered_precedence() {
        let env = HashMap::from([("K", "from-env")]);
        assert_eq!(
            layered(Some("explicit"), &env, "K", Some("file")).as_deref(),
            Some("explicit")
        );
        assert_eq!(
            layered(None, &env, "K", Some("file")).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            layered(None, &env, "MISSING", Some("file")).as_deref(),
            Some("file")
        );
        assert_eq!(layered(None, &env, "MISSING", None), None);
    }

    #[test]
    fn test_layered_empty_override_falls_through() {
        let env = HashMap::from([("K", "from-env")]);
        assert_eq!(
            layered(Some(""), &env, "K", None).as_deref(),
            Some("from-env")
        );
    }
}
