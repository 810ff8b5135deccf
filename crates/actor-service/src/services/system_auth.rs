//! Pre-shared-secret registration and authentication for system actors.
//!
//! The secret is stored as given and compared by exact equality, so
//! existing secrets keep working. The comparison itself is constant time.

use crate::errors::AcError;
use crate::models::{ActorProfile, ActorType, TokenPayload, TokenResponse};
use crate::observability::hash_for_correlation;
use crate::services::actor_directory::{validate_profile, ActorDirectory};
use crate::services::token_service::TokenIssuer;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::instrument;

pub struct SystemAuth {
    directory: Arc<ActorDirectory>,
    tokens: Arc<TokenIssuer>,
}

impl SystemAuth {
    pub fn new(directory: Arc<ActorDirectory>, tokens: Arc<TokenIssuer>) -> Self {
        Self { directory, tokens }
    }

    #[instrument(skip_all)]
    pub async fn register(
        &self,
        profile: ActorProfile,
        system_secret: SecretString,
    ) -> Result<TokenResponse, AcError> {
        validate_profile(&profile)?;

        let actor = self
            .directory
            .create_actor(profile, Some(system_secret), ActorType::SystemActor)
            .await?;

        self.tokens
            .issue(&TokenPayload::new(actor.actor_id, ActorType::SystemActor))
            .await
    }

    /// Authenticate a system actor by ID and pre-shared secret.
    ///
    /// A mismatch, or an ID that is not a system actor, is
    /// `InvalidCredentials`. `NotFound` is returned if the secret matched but
    /// the actor record is missing or no longer a system actor.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        actor_id: &str,
        system_secret: &str,
    ) -> Result<TokenResponse, AcError> {
        if !self
            .directory
            .verify_system_secret(actor_id, system_secret)
            .await?
        {
            tracing::info!(
                target: "actor.services.system_auth",
                actor = %hash_for_correlation(actor_id),
                "System actor authentication failed"
            );
            return Err(AcError::InvalidCredentials);
        }

        let actor = self
            .directory
            .get_actor(actor_id)
            .await?
            .filter(|a| a.actor_type == ActorType::SystemActor)
            .ok_or_else(|| AcError::NotFound("System actor not found".to_string()))?;

        self.tokens
            .issue(&TokenPayload::new(actor.actor_id, ActorType::SystemActor))
            .await
    }
}
