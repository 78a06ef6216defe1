//! Error types for token acquisition.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Errors that can occur while acquiring or caching bearer tokens.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Identity platform returned an error.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid request or callback payload.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration or token storage error.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The `state` returned to the redirect listener did not match.
    #[error("State mismatch on login callback — possible CSRF")]
    StateMismatch,

    /// The user did not finish the browser login in time.
    #[error("Interactive login timed out after {0} seconds")]
    LoginTimeout(u64),

    /// The authorization endpoint redirected back with an error.
    #[error("Authorization failed: {error} ({description})")]
    Authorization { error: String, description: String },
}

impl From<reqwest::Error> for IdentityError {
    fn from(e: reqwest::Error) -> Self {
        IdentityError::Network(e.to_string())
    }
}

impl From<std::io::Error> for IdentityError {
    fn from(e: std::io::Error) -> Self {
        IdentityError::Config(e.to_string())
    }
}
