//! Bearer token providers for Azure OpenAI managed-identity access.
//!
//! # Components
//!
//! - [`provider`] — `TokenProvider` trait and the shared `TokenProviderRef` handle
//! - [`oauth`] — PKCE flow: challenge generation, authorization URL, token exchange/refresh
//! - [`callback`] — Loopback redirect listener that receives the authorization code
//! - [`credential`] — Interactive browser credential tying the above together
//! - [`token_cache`] — Token persistence between runs

pub mod callback;
pub mod credential;
pub mod error;
pub mod oauth;
pub mod provider;
pub mod token_cache;

pub use credential::{BrowserOpener, InteractiveBrowserCredential};
pub use error::{IdentityError, Result};
pub use oauth::{COGNITIVE_SERVICES_SCOPE, IdentityConfig, OAuthTokens, PkceChallenge};
pub use provider::{AccessToken, StaticTokenProvider, TokenProvider, TokenProviderRef};
pub use token_cache::{
    FileTokenCache, InMemoryTokenCache, SharedTokenCache, TokenCache, TokenInfo,
    create_token_cache,
};
