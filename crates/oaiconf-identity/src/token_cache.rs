//! Token persistence for the interactive browser credential.
//!
//! Tokens are cached so a login survives process restarts; expiry is
//! checked with a refresh buffer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{IdentityError, Result};
use crate::oauth::{IdentityConfig, OAuthTokens, now_millis};

/// Token file name prefix within the oaiconf config directory.
pub const TOKEN_FILE_PREFIX: &str = "aad-tokens";

/// Token file name for an identity: `aad-tokens-<cache key>.json`.
pub fn token_file_name(config: &IdentityConfig) -> String {
    format!("{}-{}.json", TOKEN_FILE_PREFIX, config.cache_key())
}

/// Buffer time before expiry to trigger refresh (5 minutes in milliseconds).
const REFRESH_BUFFER_MS: u64 = 5 * 60 * 1000;

/// Check if tokens are expired (with buffer time).
pub fn is_token_expired(tokens: &OAuthTokens) -> bool {
    if tokens.expires_at == 0 {
        return true;
    }
    now_millis() >= tokens.expires_at.saturating_sub(REFRESH_BUFFER_MS)
}

// ============================================================================
// TokenCache Trait
// ============================================================================

/// Storage for issued tokens.
#[async_trait]
pub trait TokenCache: Send + Sync + std::fmt::Debug {
    /// Check if tokens exist.
    fn has_tokens(&self) -> bool;

    /// Save tokens to storage.
    async fn save_tokens(&self, tokens: &OAuthTokens) -> Result<()>;

    /// Load tokens from storage.
    async fn load_tokens(&self) -> Result<Option<OAuthTokens>>;

    /// Delete stored tokens.
    async fn delete_tokens(&self) -> Result<()>;

    /// Get token expiry information for display.
    async fn token_info(&self) -> Result<Option<TokenInfo>> {
        Ok(self.load_tokens().await?.map(|t| TokenInfo::from_tokens(&t)))
    }
}

// ============================================================================
// FileTokenCache
// ============================================================================

/// File-based token cache.
#[derive(Debug)]
pub struct FileTokenCache {
    token_path: PathBuf,
    cached_tokens: RwLock<Option<OAuthTokens>>,
}

impl FileTokenCache {
    /// Cache tokens for `config` under `data_dir`, one file per identity.
    pub fn for_identity(data_dir: &Path, config: &IdentityConfig) -> Self {
        Self::with_path(data_dir.join(token_file_name(config)))
    }

    /// Create with a custom token path.
    pub fn with_path(token_path: PathBuf) -> Self {
        Self {
            token_path,
            cached_tokens: RwLock::new(None),
        }
    }

    /// Get the token file path.
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }
}

#[async_trait]
impl TokenCache for FileTokenCache {
    fn has_tokens(&self) -> bool {
        self.token_path.exists()
    }

    async fn save_tokens(&self, tokens: &OAuthTokens) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                IdentityError::Config(format!("Failed to create token directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(tokens).map_err(|e| {
            IdentityError::Serialization(format!("Failed to serialize tokens: {}", e))
        })?;

        write_private(&self.token_path, json.as_bytes())
            .map_err(|e| IdentityError::Config(format!("Failed to write token file: {}", e)))?;

        *self.cached_tokens.write().await = Some(tokens.clone());

        tracing::info!(path = %self.token_path.display(), "Tokens cached");
        Ok(())
    }

    async fn load_tokens(&self) -> Result<Option<OAuthTokens>> {
        {
            let cache = self.cached_tokens.read().await;
            if cache.is_some() {
                return Ok(cache.clone());
            }
        }

        if !self.token_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.token_path)
            .map_err(|e| IdentityError::Config(format!("Failed to read token file: {}", e)))?;

        let tokens: OAuthTokens = serde_json::from_str(&content).map_err(|e| {
            IdentityError::Serialization(format!("Failed to parse token file: {}", e))
        })?;

        *self.cached_tokens.write().await = Some(tokens.clone());
        Ok(Some(tokens))
    }

    async fn delete_tokens(&self) -> Result<()> {
        if self.token_path.exists() {
            std::fs::remove_file(&self.token_path).map_err(|e| {
                IdentityError::Config(format!("Failed to delete token file: {}", e))
            })?;
        }
        *self.cached_tokens.write().await = None;
        Ok(())
    }
}

/// Write a file readable only by its owner.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a pre-existing file too.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

// ============================================================================
// InMemoryTokenCache
// ============================================================================

/// In-memory token cache; nothing outlives the process.
#[derive(Debug, Default)]
pub struct InMemoryTokenCache {
    tokens: RwLock<Option<OAuthTokens>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: OAuthTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    fn has_tokens(&self) -> bool {
        self.tokens
            .try_read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    async fn save_tokens(&self, tokens: &OAuthTokens) -> Result<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn load_tokens(&self) -> Result<Option<OAuthTokens>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn delete_tokens(&self) -> Result<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}

// ============================================================================
// TokenInfo
// ============================================================================

/// Information about stored tokens for display.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub created_at: String,
    pub expires_in_secs: u64,
    pub is_expired: bool,
    pub scope: String,
    pub can_refresh: bool,
}

impl TokenInfo {
    fn from_tokens(tokens: &OAuthTokens) -> Self {
        let now = now_millis();
        Self {
            created_at: tokens.created_at.clone(),
            expires_in_secs: tokens.expires_at.saturating_sub(now) / 1000,
            is_expired: is_token_expired(tokens),
            scope: tokens.scope.clone(),
            can_refresh: !tokens.refresh_token.is_empty(),
        }
    }

    pub fn expires_in_display(&self) -> String {
        if self.is_expired {
            if self.can_refresh {
                "Expired (will refresh on next use)".to_string()
            } else {
                "Expired (login required)".to_string()
            }
        } else {
            let hours = self.expires_in_secs / 3600;
            let minutes = (self.expires_in_secs % 3600) / 60;
            format!("{}h {}m", hours, minutes)
        }
    }
}

/// Shared token cache for use across async contexts.
pub type SharedTokenCache = Arc<dyn TokenCache>;

/// Create a shared file-based token cache for `config`.
pub fn create_token_cache(data_dir: &Path, config: &IdentityConfig) -> SharedTokenCache {
    Arc::new(FileTokenCache::for_identity(data_dir, config))
}
