//! CLI command handlers.

pub mod auth;
pub mod autogen;
pub mod mode;
pub mod show;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use oaiconf_config::{ConfigOverrides, OaiConfig};
use serde::Serialize;
use serde_json::Value;

use crate::Cli;

/// Env var naming the config file; also settable from `.env`.
pub const CONFIG_ENV: &str = "OAICONF_CONFIG";

/// Keys whose values are secrets in printed JSON.
const SECRET_KEYS: &[&str] = &["api_key"];

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Overrides assembled from CLI flags.
    pub overrides: ConfigOverrides,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build the context once `.env` has been loaded.
    ///
    /// `--config` wins; otherwise `OAICONF_CONFIG` is read again here so a
    /// value set in `.env` takes effect; otherwise the user config file.
    pub fn from_cli(cli: &Cli) -> Self {
        let mut overrides = ConfigOverrides::new();
        overrides.config_file = cli
            .config
            .clone()
            .or_else(|| {
                std::env::var_os(CONFIG_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| oaiconf_config::xdg_config_path().filter(|p| p.is_file()));
        overrides.api_key = cli.api_key.clone();
        overrides.api_version = cli.api_version.clone();
        overrides.endpoint_url = cli.endpoint.clone();
        overrides.model_name = cli.model.clone();

        Self {
            overrides,
            verbose: cli.verbose,
        }
    }

    /// Resolve the config from the process environment and flags.
    pub fn resolve(&self) -> Result<OaiConfig> {
        let config =
            OaiConfig::from_env(&self.overrides).context("Failed to resolve configuration")?;
        tracing::debug!(
            mode = %config.auth_mode(),
            source = %config.mode_source(),
            "Configuration resolved"
        );
        Ok(config)
    }
}

/// Print a value as pretty JSON, masking secrets unless `reveal` is set.
pub fn print_json<T: Serialize>(value: &T, reveal: bool) -> Result<()> {
    let mut json = serde_json::to_value(value)?;
    if !reveal {
        mask_secrets(&mut json);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if SECRET_KEYS.contains(&key.as_str()) {
                    if let Value::String(s) = v {
                        *s = mask(s);
                    }
                } else {
                    mask_secrets(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}

/// `abcd...wxyz` for long secrets, `****` otherwise.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mask() {
        assert_eq!(mask("sk-1234567890abcd"), "sk-1...abcd");
        assert_eq!(mask("short"), "****");
    }

    #[test]
    fn test_mask_secrets_nested() {
        let mut value = json!({
            "config_list": [{"api_key": "0123456789abcdef", "model": "m"}],
            "aoai_args": {"api_key": null}
        });
        mask_secrets(&mut value);
        assert_eq!(value["config_list"][0]["api_key"], json!("0123...cdef"));
        assert_eq!(value["config_list"][0]["model"], json!("m"));
        assert_eq!(value["aoai_args"]["api_key"], json!(null));
    }
}
