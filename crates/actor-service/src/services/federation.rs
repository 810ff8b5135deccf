//! External identity assertions.
//!
//! [`ExternalAssertionVerifier`] turns an opaque assertion from a
//! third-party identity provider into an email and display name. The
//! Google implementation verifies ID tokens against Google's published key
//! set, which is fetched over HTTPS and cached with a TTL.
//!
//! Every failure is reported as [`AcError::ExternalAuthFailed`]; the cause
//! is only logged.

use crate::crypto::MAX_JWT_SIZE_BYTES;
use crate::errors::AcError;
use crate::models::ExternalIdentity;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_jwks_request;
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// Google's published ID-token signing keys.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuers Google puts in ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Display name used when the ID token has no `name` claim.
pub const DEFAULT_GOOGLE_DISPLAY_NAME: &str = "Google User";

/// Default key set cache TTL in seconds (5 minutes).
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Verify an external identity assertion.
#[async_trait]
pub trait ExternalAssertionVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> Result<ExternalIdentity, AcError>;
}

/// RSA JSON Web Key as published by Google.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    /// Modulus (base64url).
    #[serde(default)]
    pub n: Option<String>,
    /// Public exponent (base64url).
    #[serde(default)]
    pub e: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<Jwk>,
}

struct CachedJwks {
    keys: HashMap<String, Jwk>,
    expires_at: Instant,
}

/// Claims read from a Google ID token; everything else is ignored.
#[derive(Deserialize)]
struct GoogleClaims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Google ID-token verifier.
///
/// Accepts RS256 tokens whose audience is the configured client ID, whose
/// issuer is Google and which carry an `email` claim.
pub struct GoogleIdTokenVerifier {
    client_id: String,
    jwks_url: String,
    http_client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedJwks>>>,
    cache_ttl: Duration,
}

impl GoogleIdTokenVerifier {
    pub fn new(client_id: String) -> Self {
        Self::with_jwks_url(
            client_id,
            GOOGLE_JWKS_URL.to_string(),
            Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
        )
    }

    /// Verifier against a specific key set endpoint and cache TTL.
    pub fn with_jwks_url(client_id: String, jwks_url: String, cache_ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "actor.services.federation", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            client_id,
            jwks_url,
            http_client,
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
        }
    }

    /// Look up a signing key, refreshing the cache when it is empty or stale.
    ///
    /// A kid missing from a fresh cache is rejected without a refetch.
    async fn get_key(&self, kid: &str) -> Result<Jwk, AcError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    record_jwks_request("hit");
                    return cached.keys.get(kid).cloned().ok_or_else(|| {
                        tracing::debug!(target: "actor.services.federation", kid = %kid, "Key not found in JWKS cache");
                        AcError::ExternalAuthFailed
                    });
                }
            }
        }

        record_jwks_request("miss");
        self.refresh_cache().await?;

        let cache = self.cache.read().await;
        cache
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or_else(|| {
                tracing::warn!(target: "actor.services.federation", kid = %kid, "Key not found in JWKS after refresh");
                AcError::ExternalAuthFailed
            })
    }

    async fn refresh_cache(&self) -> Result<(), AcError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                record_jwks_request("error");
                tracing::error!(target: "actor.services.federation", error = %e, "Failed to fetch JWKS");
                AcError::ExternalAuthFailed
            })?;

        if !response.status().is_success() {
            record_jwks_request("error");
            tracing::error!(
                target: "actor.services.federation",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AcError::ExternalAuthFailed);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            record_jwks_request("error");
            tracing::error!(target: "actor.services.federation", error = %e, "Failed to parse JWKS response");
            AcError::ExternalAuthFailed
        })?;

        let keys: HashMap<String, Jwk> = jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect();

        tracing::info!(
            target: "actor.services.federation",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        *self.cache.write().await = Some(CachedJwks {
            keys,
            expires_at: Instant::now() + self.cache_ttl,
        });

        Ok(())
    }

    fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, AcError> {
        if jwk.kty != "RSA" {
            tracing::debug!(target: "actor.services.federation", kty = %jwk.kty, "Unsupported key type");
            return Err(AcError::ExternalAuthFailed);
        }
        match (jwk.n.as_deref(), jwk.e.as_deref()) {
            (Some(n), Some(e)) => DecodingKey::from_rsa_components(n, e).map_err(|err| {
                tracing::debug!(target: "actor.services.federation", error = %err, "Invalid RSA key");
                AcError::ExternalAuthFailed
            }),
            _ => Err(AcError::ExternalAuthFailed),
        }
    }
}

#[async_trait]
impl ExternalAssertionVerifier for GoogleIdTokenVerifier {
    #[instrument(skip_all)]
    async fn verify(&self, assertion: &str) -> Result<ExternalIdentity, AcError> {
        if assertion.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(target: "actor.services.federation", "ID token exceeds size limit");
            return Err(AcError::ExternalAuthFailed);
        }

        let header = decode_header(assertion).map_err(|e| {
            tracing::debug!(target: "actor.services.federation", error = %e, "Malformed ID token header");
            AcError::ExternalAuthFailed
        })?;
        if header.alg != Algorithm::RS256 {
            tracing::debug!(target: "actor.services.federation", alg = ?header.alg, "Unexpected ID token algorithm");
            return Err(AcError::ExternalAuthFailed);
        }
        let kid = header.kid.ok_or_else(|| {
            tracing::debug!(target: "actor.services.federation", "ID token has no kid");
            AcError::ExternalAuthFailed
        })?;

        let jwk = self.get_key(&kid).await?;
        let key = Self::decoding_key(&jwk)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let claims = decode::<GoogleClaims>(assertion, &key, &validation)
            .map_err(|e| {
                tracing::debug!(target: "actor.services.federation", error = %e, "ID token verification failed");
                AcError::ExternalAuthFailed
            })?
            .claims;

        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                tracing::debug!(target: "actor.services.federation", "ID token has no email claim");
                AcError::ExternalAuthFailed
            })?;
        let display_name = claims
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GOOGLE_DISPLAY_NAME.to_string());

        tracing::debug!(
            target: "actor.services.federation",
            email = %hash_for_correlation(&email),
            "Google ID token verified"
        );

        Ok(ExternalIdentity {
            email,
            display_name,
        })
    }
}

/// Mock verifier for tests and local wiring.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct MockAssertionVerifier {
        identities: HashMap<String, ExternalIdentity>,
        call_count: AtomicUsize,
    }

    impl MockAssertionVerifier {
        /// A verifier that rejects every assertion.
        pub fn failing() -> Self {
            Self {
                identities: HashMap::new(),
                call_count: AtomicUsize::new(0),
            }
        }

        /// A verifier that accepts exactly one assertion.
        pub fn accepting(assertion: &str, email: &str, display_name: &str) -> Self {
            Self::failing().with_identity(assertion, email, display_name)
        }

        /// Also accept `assertion` as proof of the given identity.
        pub fn with_identity(mut self, assertion: &str, email: &str, display_name: &str) -> Self {
            self.identities.insert(
                assertion.to_string(),
                ExternalIdentity {
                    email: email.to_string(),
                    display_name: display_name.to_string(),
                },
            );
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExternalAssertionVerifier for MockAssertionVerifier {
        async fn verify(&self, assertion: &str) -> Result<ExternalIdentity, AcError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.identities
                .get(assertion)
                .cloned()
                .ok_or(AcError::ExternalAuthFailed)
        }
    }
}
