//! Interactive browser credential.
//!
//! Opens the system browser on the Entra ID authorize page, receives the
//! redirect on a loopback listener, and exchanges the code for tokens.
//! Tokens are cached and refreshed; a new login only happens when there is
//! no usable cached or refreshable token.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::callback::CallbackServer;
use crate::error::Result;
use crate::oauth::{
    IdentityConfig, OAuthTokens, PkceChallenge, build_authorization_url,
    exchange_code_for_tokens, generate_state, refresh_access_token,
};
use crate::provider::{AccessToken, TokenProvider};
use crate::token_cache::{InMemoryTokenCache, SharedTokenCache, TokenCache, is_token_expired};

/// Default time allowed for the user to finish logging in.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Opens a URL in a browser.
pub type BrowserOpener = Arc<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

/// Token provider backed by an interactive browser login.
pub struct InteractiveBrowserCredential {
    config: IdentityConfig,
    cache: SharedTokenCache,
    login_timeout: Duration,
    bind_addr: SocketAddr,
    opener: BrowserOpener,
    // Serializes token acquisition so concurrent callers share one login.
    gate: Mutex<()>,
}

impl fmt::Debug for InteractiveBrowserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveBrowserCredential")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("login_timeout", &self.login_timeout)
            .field("bind_addr", &self.bind_addr)
            .finish_non_exhaustive()
    }
}

impl InteractiveBrowserCredential {
    /// Create a credential that caches tokens in `cache`.
    pub fn new(config: IdentityConfig, cache: SharedTokenCache) -> Self {
        Self {
            config,
            cache,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            opener: Arc::new(open_url),
            gate: Mutex::new(()),
        }
    }

    /// Create a credential whose tokens live only as long as the process.
    pub fn in_memory(config: IdentityConfig) -> Self {
        Self::new(config, Arc::new(InMemoryTokenCache::new()))
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    pub fn with_browser_opener(mut self, opener: BrowserOpener) -> Self {
        self.opener = opener;
        self
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub fn cache(&self) -> &SharedTokenCache {
        &self.cache
    }

    /// Run the interactive login unconditionally and cache the result.
    pub async fn login(&self) -> Result<OAuthTokens> {
        let server = CallbackServer::bind(self.bind_addr).await?;
        let redirect_uri = server.redirect_uri();
        let pkce = PkceChallenge::generate();
        let state = generate_state();
        let auth_url =
            build_authorization_url(&self.config, &redirect_uri, &pkce.challenge, &state);

        tracing::info!(
            tenant = %self.config.tenant_id,
            redirect_uri = %redirect_uri,
            "Starting interactive browser login"
        );
        tracing::info!("Sign in at: {}", auth_url);
        if let Err(e) = (self.opener)(&auth_url) {
            tracing::warn!(error = %e, "Could not open browser; open the URL above manually");
        }

        let code = server.wait(self.login_timeout).await?.into_code(&state)?;
        let tokens =
            exchange_code_for_tokens(&self.config, &code, &pkce.verifier, &redirect_uri).await?;
        self.cache.save_tokens(&tokens).await?;
        tracing::info!(expires_in = tokens.expires_in, "Interactive login succeeded");
        Ok(tokens)
    }

    /// Forget cached tokens.
    pub async fn logout(&self) -> Result<()> {
        self.cache.delete_tokens().await
    }

    async fn refresh(&self, stale: OAuthTokens) -> Result<OAuthTokens> {
        tracing::info!("Token expired, refreshing");
        let mut fresh = refresh_access_token(&self.config, &stale.refresh_token).await?;
        if fresh.refresh_token.is_empty() {
            fresh.refresh_token = stale.refresh_token;
        }
        self.cache.save_tokens(&fresh).await?;
        tracing::info!("Token refreshed");
        Ok(fresh)
    }
}

#[async_trait]
impl TokenProvider for InteractiveBrowserCredential {
    async fn get_token(&self) -> Result<AccessToken> {
        let _gate = self.gate.lock().await;

        if let Some(cached) = self.cache.load_tokens().await? {
            if !is_token_expired(&cached) {
                return Ok(AccessToken::new(cached.access_token, cached.expires_at));
            }
            if !cached.refresh_token.is_empty() {
                match self.refresh(cached).await {
                    Ok(fresh) => return Ok(AccessToken::new(fresh.access_token, fresh.expires_at)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Token refresh failed, falling back to login")
                    }
                }
            }
        }

        let tokens = self.login().await?;
        Ok(AccessToken::new(tokens.access_token, tokens.expires_at))
    }

    fn descriptor(&self) -> String {
        format!("interactive-browser:{}", self.config.scope)
    }
}

/// Open a URL with the platform's default handler.
///
/// A handler that exits non-zero (no browser on a headless box) is an error.
pub fn open_url(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        let status = std::process::Command::new("open").arg(url).status()?;
        check_opener_status("open", status)?;
    }
    #[cfg(target_os = "linux")]
    {
        let status = std::process::Command::new("xdg-open").arg(url).status()?;
        check_opener_status("xdg-open", status)?;
    }
    #[cfg(target_os = "windows")]
    {
        let status = std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .status()?;
        check_opener_status("start", status)?;
    }
    Ok(())
}

fn check_opener_status(program: &str, status: std::process::ExitStatus) -> std::io::Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("{} exited with {}", program, status)))
    }
}
