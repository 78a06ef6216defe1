//! OAuth 2.0 authorization code + PKCE flow against the Microsoft identity platform.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{IdentityError, Result};

/// Scope for Azure OpenAI (Cognitive Services) data-plane access.
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Public client id used by developer sign-on tooling for interactive login.
pub const DEVELOPER_SIGN_ON_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

/// Default Microsoft Entra authority host.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Tenant alias that accepts any work or school account.
pub const DEFAULT_TENANT: &str = "organizations";

/// OAuth configuration for an Entra ID tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub client_id: String,
    pub authority: String,
    pub tenant_id: String,
    pub scope: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self::cognitive_services()
    }
}

impl IdentityConfig {
    /// Config for Azure OpenAI with the developer sign-on client.
    pub fn cognitive_services() -> Self {
        Self {
            client_id: DEVELOPER_SIGN_ON_CLIENT_ID.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            tenant_id: DEFAULT_TENANT.to_string(),
            scope: COGNITIVE_SERVICES_SCOPE.to_string(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// `<authority>/<tenant>/oauth2/v2.0/authorize`
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/authorize",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// `<authority>/<tenant>/oauth2/v2.0/token`
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Short file-safe key identifying this authority, tenant, client and scope.
    ///
    /// Tokens issued under one identity must never be served for another.
    pub fn cache_key(&self) -> String {
        let digest = Sha256::digest(
            format!(
                "{}\n{}\n{}\n{}",
                self.authority.trim_end_matches('/'),
                self.tenant_id,
                self.client_id,
                self.scope
            )
            .as_bytes(),
        );
        URL_SAFE_NO_PAD.encode(&digest[..12])
    }

    /// Requested scopes, including `offline_access` so a refresh token is issued.
    pub fn requested_scopes(&self) -> String {
        format!("{} offline_access", self.scope)
    }
}

/// PKCE code verifier and challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge pair.
    pub fn generate() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

        Self {
            verifier,
            challenge,
        }
    }
}

/// Generate a random state string for CSRF protection.
pub fn generate_state() -> String {
    let mut state_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut state_bytes);
    URL_SAFE_NO_PAD.encode(state_bytes)
}

/// Build the authorization URL the browser is sent to.
pub fn build_authorization_url(
    config: &IdentityConfig,
    redirect_uri: &str,
    challenge: &str,
    state: &str,
) -> String {
    let scopes = config.requested_scopes();
    let params = [
        ("client_id", config.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", redirect_uri),
        ("response_mode", "query"),
        ("scope", scopes.as_str()),
        ("code_challenge", challenge),
        ("code_challenge_method", "S256"),
        ("state", state),
        ("prompt", "select_account"),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_url(), query)
}

/// Tokens issued by the token endpoint, with local bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    /// Absolute expiry, milliseconds since the Unix epoch.
    #[serde(default)]
    pub expires_at: u64,
    #[serde(default)]
    pub created_at: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthTokens {
    fn stamp(mut self) -> Self {
        self.expires_at = now_millis().saturating_add(self.expires_in.saturating_mul(1000));
        self.created_at = chrono::Utc::now().to_rfc3339();
        self
    }
}

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code_for_tokens(
    config: &IdentityConfig,
    code: &str,
    verifier: &str,
    redirect_uri: &str,
) -> Result<OAuthTokens> {
    let scopes = config.requested_scopes();
    let form = [
        ("grant_type", "authorization_code"),
        ("client_id", config.client_id.as_str()),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("code_verifier", verifier),
        ("scope", scopes.as_str()),
    ];
    request_tokens(&config.token_url(), &form, "Token exchange").await
}

/// Refresh an access token using a refresh token.
pub async fn refresh_access_token(
    config: &IdentityConfig,
    refresh_token: &str,
) -> Result<OAuthTokens> {
    let scopes = config.requested_scopes();
    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", config.client_id.as_str()),
        ("refresh_token", refresh_token),
        ("scope", scopes.as_str()),
    ];
    request_tokens(&config.token_url(), &form, "Token refresh").await
}

async fn request_tokens(url: &str, form: &[(&str, &str)], what: &str) -> Result<OAuthTokens> {
    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .form(form)
        .send()
        .await
        .map_err(|e| IdentityError::Network(format!("{} request failed: {}", what, e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => body,
        };
        return Err(IdentityError::Backend(format!(
            "{} failed ({}): {}",
            what, status, detail
        )));
    }

    let tokens: OAuthTokens = response
        .json()
        .await
        .map_err(|e| IdentityError::Backend(format!("Failed to parse {} response: {}", what, e)))?;

    Ok(tokens.stamp())
}

/// Current time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
