use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::AcError;
use crate::models::ActorType;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::{hmac, rand::SystemRandom};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::instrument;

/// Maximum accepted token size in bytes (4KB).
///
/// Checked before any base64 decoding or signature work.
pub const MAX_JWT_SIZE_BYTES: usize = 4096;

/// Bcrypt hash of a throwaway value at the default cost (12).
///
/// Only matches real hash timing when `BCRYPT_COST` is left at 12;
/// `BcryptHasher` derives its own at the configured cost and keeps this as
/// a fallback.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Message used for every token rejection so callers cannot tell the
/// failure modes apart.
const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// Claims sealed inside an access token.
///
/// Debug redacts `actorId`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub actor_id: String,
    pub actor_type: ActorType,
    pub iat: i64,
    pub exp: i64,
}

impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("actor_id", &"[REDACTED]")
            .field("actor_type", &self.actor_type)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Claims sealed inside a refresh token.
///
/// `jti` makes two refresh tokens minted in the same second for the same
/// actor distinct, so each one gets its own ledger entry.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub actor_id: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl fmt::Debug for RefreshClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshClaims")
            .field("actor_id", &"[REDACTED]")
            .field("jti", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Registered timestamps `verify_jwt` checks after the signature.
pub trait ClaimTimes {
    fn issued_at(&self) -> i64;

    fn expires_at(&self) -> i64;
}

impl ClaimTimes for AccessClaims {
    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl ClaimTimes for RefreshClaims {
    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// HMAC signing material derived from the shared JWT secret.
///
/// Debug is manually implemented so key material never reaches logs.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Sign claims as an HS256 JWT.
#[instrument(skip_all)]
pub fn sign_jwt<T: Serialize>(claims: &T, keys: &JwtKeys) -> Result<String, AcError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &keys.encoding)
        .map_err(|e| AcError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify an HS256 JWT and extract its claims.
///
/// Validates, in order:
/// - Token size (must be <= MAX_JWT_SIZE_BYTES)
/// - Signature and algorithm
/// - Expiration when `validate_exp` is set: a token is dead from its `exp`
///   second onward
/// - Issued-at no more than `clock_skew_seconds` in the future
///
/// Every failure collapses to the same `InvalidToken` message; the cause is
/// only logged at debug level.
#[instrument(skip_all)]
pub fn verify_jwt<T>(
    token: &str,
    keys: &JwtKeys,
    validate_exp: bool,
    clock_skew_seconds: i64,
) -> Result<T, AcError>
where
    T: DeserializeOwned + ClaimTimes,
{
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "actor.crypto",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AcError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = validate_exp;
    validation.leeway = 0;

    let token_data = decode::<T>(token, &keys.decoding, &validation).map_err(|e| {
        tracing::debug!(target: "actor.crypto", error = %e, "Token verification failed");
        AcError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
    })?;

    let now = chrono::Utc::now().timestamp();

    // jsonwebtoken still accepts exp == now with zero leeway
    if validate_exp && token_data.claims.expires_at() <= now {
        tracing::debug!(
            target: "actor.crypto",
            exp = token_data.claims.expires_at(),
            now = now,
            "Token rejected: expired"
        );
        return Err(AcError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()));
    }

    let max_iat = now.saturating_add(clock_skew_seconds);
    if token_data.claims.issued_at() > max_iat {
        tracing::debug!(
            target: "actor.crypto",
            iat = token_data.claims.issued_at(),
            now = now,
            clock_skew_seconds = clock_skew_seconds,
            "Token rejected: iat too far in the future"
        );
        return Err(AcError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()));
    }

    Ok(token_data.claims)
}

/// Hash a password with bcrypt at the given cost.
///
/// The cost range is re-checked here even though configuration already
/// validated it.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AcError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AcError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| AcError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AcError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AcError::Crypto(format!("Password verification failed: {}", e)))
}

/// Compare a presented shared secret with the stored one in constant time.
///
/// Both sides are MACed under a fresh random key and the tags compared with
/// `hmac::verify`, so neither content nor length leaks through timing.
pub fn secrets_match(presented: &str, stored: &str) -> Result<bool, AcError> {
    let rng = SystemRandom::new();
    let key = hmac::Key::generate(hmac::HMAC_SHA256, &rng)
        .map_err(|e| AcError::Crypto(format!("Comparison key generation failed: {}", e)))?;
    let stored_tag = hmac::sign(&key, stored.as_bytes());
    Ok(hmac::verify(&key, presented.as_bytes(), stored_tag.as_ref()).is_ok())
}

/// Derive an actor ID: lowercase hex SHA-256 of the email followed by the
/// registration time in epoch milliseconds.
pub fn derive_actor_id(email: &str, registered_at_millis: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(registered_at_millis.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
