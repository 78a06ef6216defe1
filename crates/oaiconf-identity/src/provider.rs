//! Bearer token providers.
//!
//! A provider yields a short-lived token on demand. Callers hold a
//! [`TokenProviderRef`] and never the token itself.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::error::Result;

/// A bearer token with its absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Milliseconds since the Unix epoch; 0 when unknown.
    pub expires_at: u64,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: u64) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Something that can produce a bearer token on demand.
#[async_trait]
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// Get a valid token, logging in or refreshing as needed.
    async fn get_token(&self) -> Result<AccessToken>;

    /// Short description of where tokens come from, e.g.
    /// `interactive-browser:https://cognitiveservices.azure.com/.default`.
    fn descriptor(&self) -> String;
}

/// Shared, clonable handle to a token provider.
///
/// Serializes as the provider's descriptor.
#[derive(Clone)]
pub struct TokenProviderRef(Arc<dyn TokenProvider>);

impl TokenProviderRef {
    pub fn new(provider: impl TokenProvider + 'static) -> Self {
        Self(Arc::new(provider))
    }

    pub async fn get_token(&self) -> Result<AccessToken> {
        self.0.get_token().await
    }

    pub fn descriptor(&self) -> String {
        self.0.descriptor()
    }
}

impl fmt::Debug for TokenProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenProviderRef")
            .field(&self.descriptor())
            .finish()
    }
}

impl PartialEq for TokenProviderRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Serialize for TokenProviderRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.descriptor())
    }
}

/// Provider that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token, 0),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<AccessToken> {
        Ok(self.token.clone())
    }

    fn descriptor(&self) -> String {
        "static".to_string()
    }
}
