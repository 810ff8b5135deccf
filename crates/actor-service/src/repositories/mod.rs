//! Storage seams for actor records and the refresh-token ledger.
//!
//! Each store is a trait so the service can run over Postgres
//! ([`actors::PgActorStore`], [`refresh_tokens::PgRefreshTokenStore`]) or
//! in process ([`memory`]). Both backends enforce the same uniqueness rules.

pub mod actors;
pub mod memory;
pub mod refresh_tokens;

use crate::errors::AcError;
use crate::models::{Actor, ActorType, NewActor, RefreshTokenRecord};
use async_trait::async_trait;
use secrecy::SecretString;

/// Credential material for one actor, as read back for verification only.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub actor_id: String,
    pub actor_type: ActorType,
    pub credential: Option<SecretString>,
}

/// Durable CRUD over actor records.
///
/// Email and phone are unique across all actors; a violation surfaces as
/// [`AcError::Conflict`].
#[async_trait]
pub trait ActorStore: Send + Sync {
    /// Insert the actor, or overwrite its profile fields when the actor ID
    /// already exists. A stored credential is never replaced.
    async fn upsert(&self, actor: &NewActor) -> Result<Actor, AcError>;

    async fn get_by_id(&self, actor_id: &str) -> Result<Option<Actor>, AcError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<Actor>, AcError>;

    /// Credential of the actor with this email and type, if any.
    async fn get_credential_by_email(
        &self,
        email: &str,
        actor_type: ActorType,
    ) -> Result<Option<StoredCredential>, AcError>;

    /// Credential of the actor with this ID and type, if any.
    async fn get_credential_by_id(
        &self,
        actor_id: &str,
        actor_type: ActorType,
    ) -> Result<Option<StoredCredential>, AcError>;
}

/// Append-only ledger of issued refresh tokens.
///
/// Records are never deleted and `revoked` only ever moves from false to true.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Record a newly issued refresh token as live.
    async fn insert(&self, actor_id: &str, refresh_token: &str) -> Result<(), AcError>;

    /// True when the actor has at least one non-revoked record.
    async fn has_live_token(&self, actor_id: &str) -> Result<bool, AcError>;

    /// True when this exact token is recorded for the actor and not revoked.
    async fn is_token_live(&self, actor_id: &str, refresh_token: &str) -> Result<bool, AcError>;

    /// Revoke every record for the actor. Returns how many flipped.
    async fn revoke_all(&self, actor_id: &str) -> Result<u64, AcError>;

    /// All records for the actor, newest first.
    async fn list_for_actor(&self, actor_id: &str) -> Result<Vec<RefreshTokenRecord>, AcError>;
}

/// Open the Postgres pool with the configured size and acquire timeout.
pub async fn connect_pool(config: &crate::config::Config) -> Result<sqlx::PgPool, AcError> {
    let database_url = config.require_database_url()?;

    sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_connect_timeout)
        .connect(database_url)
        .await
        .map_err(|e| AcError::Database(format!("Failed to connect to database: {}", e)))
}

/// Create the `actors` and `refresh_tokens` tables if they are missing.
pub async fn apply_migrations(pool: &sqlx::PgPool) -> Result<(), AcError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| AcError::Database(format!("Failed to apply migrations: {}", e)))
}
