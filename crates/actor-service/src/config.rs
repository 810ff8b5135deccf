use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default bcrypt cost factor for password hashing.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest bcrypt cost accepted from configuration.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Highest bcrypt cost accepted from configuration.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Default tolerance for issued-at claims that lie in the future.
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Upper bound for the issued-at tolerance.
pub const MAX_JWT_CLOCK_SKEW_SECONDS: i64 = 600;

/// Minimum length of the HMAC signing secret in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECONDS: u64 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: SecretString,
    pub google_client_id: Option<String>,
    pub bcrypt_cost: u32,
    pub jwt_clock_skew_seconds: i64,
    pub db_max_connections: u32,
    pub db_connect_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars.get("DATABASE_URL").cloned();

        let jwt_secret = vars
            .get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        let google_client_id = vars
            .get("GOOGLE_CLIENT_ID")
            .filter(|s| !s.is_empty())
            .cloned();

        let bcrypt_cost = parse_or_default(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: "BCRYPT_COST".to_string(),
                reason: format!(
                    "must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, bcrypt_cost
                ),
            });
        }

        let jwt_clock_skew_seconds = parse_or_default(
            vars,
            "JWT_CLOCK_SKEW_SECONDS",
            DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        )?;
        if !(0..=MAX_JWT_CLOCK_SKEW_SECONDS).contains(&jwt_clock_skew_seconds) {
            return Err(ConfigError::InvalidValue {
                name: "JWT_CLOCK_SKEW_SECONDS".to_string(),
                reason: format!(
                    "must be between 0 and {}, got {}",
                    MAX_JWT_CLOCK_SKEW_SECONDS, jwt_clock_skew_seconds
                ),
            });
        }

        let db_max_connections =
            parse_or_default(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let db_connect_timeout_seconds = parse_or_default(
            vars,
            "DB_CONNECT_TIMEOUT_SECONDS",
            DEFAULT_DB_CONNECT_TIMEOUT_SECONDS,
        )?;

        Ok(Config {
            database_url,
            jwt_secret: SecretString::from(jwt_secret.clone()),
            google_client_id,
            bcrypt_cost,
            jwt_clock_skew_seconds,
            db_max_connections,
            db_connect_timeout: Duration::from_secs(db_connect_timeout_seconds),
        })
    }

    /// Database URL, required by the Postgres backend.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }

    /// Google client ID, required only by the third-party strategy.
    pub fn require_google_client_id(&self) -> Result<&str, ConfigError> {
        self.google_client_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_CLIENT_ID".to_string()))
    }

    pub(crate) fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

impl From<ConfigError> for crate::errors::AcError {
    fn from(err: ConfigError) -> Self {
        crate::errors::AcError::Configuration(err.to_string())
    }
}

fn parse_or_default<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
