//! In-memory test harness for end-to-end flows
//!
//! Provides `TestActorAuth`: the full `ActorAuth` facade over in-memory
//! stores and minimum-cost bcrypt, with direct handles on the stores so
//! tests can inspect what was persisted.

use crate::crypto_fixtures::TEST_JWT_SECRET;
use crate::test_ids::{
    alice_profile, billing_profile, TEST_GOOGLE_CLIENT_ID, TEST_PASSWORD, TEST_SYSTEM_SECRET,
};
use actor_service::config::{Config, MIN_BCRYPT_COST};
use actor_service::models::TokenResponse;
use actor_service::repositories::memory::{MemoryActorStore, MemoryRefreshTokenStore};
use actor_service::services::{BcryptHasher, ExternalAssertionVerifier, GoogleIdTokenVerifier};
use actor_service::{ActorAuth, ActorAuthParts};
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Test harness wrapping a fully wired `ActorAuth`
///
/// # Example
/// ```rust,ignore
/// let harness = TestActorAuth::new();
/// let (actor_id, tokens) = harness.register_alice().await?;
///
/// harness.auth().revoke_refresh_token(&actor_id).await?;
/// let records = harness.refresh_tokens().list_for_actor(&actor_id).await?;
/// assert!(records.iter().all(|r| r.revoked));
/// ```
pub struct TestActorAuth {
    auth: ActorAuth,
    config: Config,
    actors: Arc<MemoryActorStore>,
    refresh_tokens: Arc<MemoryRefreshTokenStore>,
}

impl TestActorAuth {
    /// Harness without federated sign-in
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Harness whose Google sign-in goes through `verifier`
    pub fn with_verifier(verifier: Arc<dyn ExternalAssertionVerifier>) -> Self {
        Self::build(Some(verifier))
    }

    /// Harness verifying Google ID tokens against a key set served at
    /// `jwks_url` (typically a wiremock server)
    pub fn with_google_jwks(jwks_url: &str) -> Self {
        Self::with_verifier(Arc::new(GoogleIdTokenVerifier::with_jwks_url(
            TEST_GOOGLE_CLIENT_ID.to_string(),
            jwks_url.to_string(),
            Duration::from_secs(3600),
        )))
    }

    fn build(verifier: Option<Arc<dyn ExternalAssertionVerifier>>) -> Self {
        let config = test_config();
        let actors = Arc::new(MemoryActorStore::new());
        let refresh_tokens = Arc::new(MemoryRefreshTokenStore::new());

        let auth = ActorAuth::from_parts(
            &config,
            ActorAuthParts {
                actors: actors.clone(),
                refresh_tokens: refresh_tokens.clone(),
                hasher: Arc::new(BcryptHasher::new(MIN_BCRYPT_COST)),
                assertion_verifier: verifier,
            },
        );

        Self {
            auth,
            config,
            actors,
            refresh_tokens,
        }
    }

    pub fn auth(&self) -> &ActorAuth {
        &self.auth
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn actors(&self) -> &MemoryActorStore {
        &self.actors
    }

    pub fn refresh_tokens(&self) -> &MemoryRefreshTokenStore {
        &self.refresh_tokens
    }

    /// Register Alice with `TEST_PASSWORD` and return her actor ID and tokens
    pub async fn register_alice(&self) -> Result<(String, TokenResponse), anyhow::Error> {
        let tokens = self
            .auth
            .register_user(alice_profile(), TEST_PASSWORD)
            .await?;
        let actor_id = self.auth.payload_from_token_response(&tokens)?.actor_id;
        Ok((actor_id, tokens))
    }

    /// Register the billing system actor with `TEST_SYSTEM_SECRET`
    pub async fn register_billing(&self) -> Result<(String, TokenResponse), anyhow::Error> {
        let tokens = self
            .auth
            .register_system_actor(billing_profile(), SecretString::from(TEST_SYSTEM_SECRET))
            .await?;
        let actor_id = self.auth.payload_from_token_response(&tokens)?.actor_id;
        Ok((actor_id, tokens))
    }
}

impl Default for TestActorAuth {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration with the fixture secret and minimum bcrypt cost
pub fn test_config() -> Config {
    let vars = HashMap::from([
        ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
        ("BCRYPT_COST".to_string(), MIN_BCRYPT_COST.to_string()),
        (
            "GOOGLE_CLIENT_ID".to_string(),
            TEST_GOOGLE_CLIENT_ID.to_string(),
        ),
    ]);
    Config::from_vars(&vars).expect("test configuration is valid")
}
