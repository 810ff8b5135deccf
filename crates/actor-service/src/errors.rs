use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Refresh denied: no live refresh token for actor")]
    RefreshDenied,

    #[error("External authentication failed")]
    ExternalAuthFailed,

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AcError {
    /// Stable error kind exposed to callers.
    ///
    /// These strings are the contract at the service boundary; driver and
    /// signing details stay in the `Display` output for logs only.
    pub fn code(&self) -> &'static str {
        match self {
            AcError::Configuration(_) => "CONFIGURATION_ERROR",
            AcError::Database(_) => "DATABASE_ERROR",
            AcError::Conflict(_) => "CONFLICT",
            AcError::Crypto(_) => "CRYPTO_ERROR",
            AcError::InvalidInput(_) => "INVALID_INPUT",
            AcError::InvalidCredentials => "INVALID_CREDENTIALS",
            AcError::InvalidToken(_) => "INVALID_TOKEN",
            AcError::RefreshDenied => "REFRESH_DENIED",
            AcError::ExternalAuthFailed => "EXTERNAL_AUTH_FAILED",
            AcError::NotFound(_) => "NOT_FOUND",
        }
    }

    /// Message safe to hand to a caller.
    pub fn public_message(&self) -> String {
        match self {
            AcError::Configuration(_) => "Service is not configured".to_string(),
            AcError::Database(_) => "An internal database error occurred".to_string(),
            AcError::Conflict(msg) => msg.clone(),
            AcError::Crypto(_) => "An internal cryptographic error occurred".to_string(),
            AcError::InvalidInput(msg) => msg.clone(),
            AcError::InvalidCredentials => "Invalid credentials".to_string(),
            AcError::InvalidToken(_) => "The access token is invalid or expired".to_string(),
            AcError::RefreshDenied => {
                "Refresh token is either absent or has been revoked".to_string()
            }
            AcError::ExternalAuthFailed => "Authentication failed".to_string(),
            AcError::NotFound(msg) => msg.clone(),
        }
    }

    /// True when the failure was caused by the caller's input rather than
    /// by the service or its stores.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AcError::Configuration(_) | AcError::Database(_) | AcError::Crypto(_)
        )
    }
}
