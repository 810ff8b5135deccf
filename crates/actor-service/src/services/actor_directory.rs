//! Actor directory: ID assignment, lookup and credential checks.
//!
//! The directory is the only component the strategies talk to for actor
//! records. It owns two verification paths:
//! - users: bcrypt hash comparison, with a dummy verify for unknown emails
//! - system actors: exact equality over the stored plaintext secret,
//!   compared in constant time

use crate::crypto;
use crate::errors::AcError;
use crate::models::{Actor, ActorProfile, ActorType, NewActor};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_bcrypt_duration;
use crate::repositories::ActorStore;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::instrument;

/// One-way hashing capability for user passwords.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, AcError>;

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, AcError>;

    /// Burn roughly one `verify` worth of time when there is no stored hash.
    fn verify_missing(&self, plain: &str) {
        let _ = self.verify(plain, crypto::DUMMY_PASSWORD_HASH);
    }
}

/// Bcrypt at a fixed cost.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
    dummy_hash: OnceLock<String>,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Throwaway hash at this hasher's cost, computed on first use.
    pub fn dummy_hash(&self) -> &str {
        self.dummy_hash.get_or_init(|| {
            crypto::hash_password("unknown-actor-placeholder", self.cost).unwrap_or_else(|e| {
                tracing::warn!(
                    target: "actor.services.directory",
                    error = %e,
                    "Falling back to the default-cost dummy hash"
                );
                crypto::DUMMY_PASSWORD_HASH.to_string()
            })
        })
    }
}

impl SecretHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, AcError> {
        let start = Instant::now();
        let hashed = crypto::hash_password(plain, self.cost);
        record_bcrypt_duration("hash", start.elapsed());
        hashed
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, AcError> {
        let start = Instant::now();
        let valid = crypto::verify_password(plain, hash);
        record_bcrypt_duration("verify", start.elapsed());
        valid
    }

    fn verify_missing(&self, plain: &str) {
        let _ = self.verify(plain, self.dummy_hash());
    }
}

/// Check registration fields before anything is hashed or stored.
pub fn validate_profile(profile: &ActorProfile) -> Result<(), AcError> {
    if profile.name.trim().is_empty() {
        return Err(AcError::InvalidInput("Name cannot be empty".to_string()));
    }
    if !is_valid_email(&profile.email) {
        return Err(AcError::InvalidInput("Invalid email format".to_string()));
    }
    Ok(())
}

/// `local@domain.tld`: one `@`, non-empty local part, dotted domain with no
/// empty labels, no whitespace anywhere.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    let first_ok = labels.next().is_some_and(|l| !l.is_empty());
    let rest: Vec<&str> = labels.collect();
    first_ok && !rest.is_empty() && rest.iter().all(|l| !l.is_empty())
}

pub struct ActorDirectory {
    store: Arc<dyn ActorStore>,
    hasher: Arc<dyn SecretHasher>,
}

impl ActorDirectory {
    pub fn new(store: Arc<dyn ActorStore>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self { store, hasher }
    }

    /// Hash a user password with the configured hasher.
    pub fn hash_password(&self, password: &str) -> Result<SecretString, AcError> {
        self.hasher.hash(password).map(SecretString::from)
    }

    /// Create an actor with a freshly derived ID and persist it.
    ///
    /// The ID is the SHA-256 of the email followed by the current time in
    /// milliseconds. A blank phone is stored as absent. A unique violation on
    /// email or phone is returned as [`AcError::Conflict`].
    #[instrument(skip_all, fields(actor_type = %actor_type))]
    pub async fn create_actor(
        &self,
        profile: ActorProfile,
        credential: Option<SecretString>,
        actor_type: ActorType,
    ) -> Result<Actor, AcError> {
        let actor_id = crypto::derive_actor_id(&profile.email, Utc::now().timestamp_millis());

        let new_actor = NewActor {
            actor_id,
            name: profile.name,
            phone: profile.phone.filter(|p| !p.trim().is_empty()),
            email: profile.email,
            credential,
            dob: profile.dob,
            actor_type,
        };

        let actor = self.store.upsert(&new_actor).await?;

        tracing::info!(
            target: "actor.services.directory",
            actor = %hash_for_correlation(&actor.actor_id),
            actor_type = %actor.actor_type,
            "Actor created"
        );

        Ok(actor)
    }

    pub async fn get_actor(&self, actor_id: &str) -> Result<Option<Actor>, AcError> {
        self.store.get_by_id(actor_id).await
    }

    pub async fn get_actor_by_email(&self, email: &str) -> Result<Option<Actor>, AcError> {
        self.store.get_by_email(email).await
    }

    /// Check a user's password.
    ///
    /// Returns `Ok(false)`, never an error, when no user actor has this email.
    /// A bcrypt verify runs on every path so both cases cost the same.
    #[instrument(skip_all)]
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<bool, AcError> {
        let stored = self
            .store
            .get_credential_by_email(email, ActorType::User)
            .await?;

        let hash = stored
            .as_ref()
            .and_then(|s| s.credential.as_ref())
            .map(|c| c.expose_secret());

        match hash {
            Some(hash) => self.hasher.verify(password, hash),
            None => {
                // Federated users have no password; treat like an unknown email
                self.hasher.verify_missing(password);
                tracing::debug!(
                    target: "actor.services.directory",
                    email = %hash_for_correlation(email),
                    "No password on record"
                );
                Ok(false)
            }
        }
    }

    /// Check a system actor's pre-shared secret by exact equality.
    ///
    /// Returns `Ok(false)` when no system actor has this ID.
    #[instrument(skip_all)]
    pub async fn verify_system_secret(
        &self,
        actor_id: &str,
        presented: &str,
    ) -> Result<bool, AcError> {
        let stored = self
            .store
            .get_credential_by_id(actor_id, ActorType::SystemActor)
            .await?;

        match stored.as_ref().and_then(|s| s.credential.as_ref()) {
            Some(secret) => crypto::secrets_match(presented, secret.expose_secret()),
            None => Ok(false),
        }
    }
}
