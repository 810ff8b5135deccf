//! Password-based registration and login for end users.

use crate::errors::AcError;
use crate::models::{ActorProfile, ActorType, TokenPayload, TokenResponse};
use crate::observability::hash_for_correlation;
use crate::services::actor_directory::{validate_profile, ActorDirectory};
use crate::services::token_service::TokenIssuer;
use std::sync::Arc;
use tracing::instrument;

pub struct UserAuth {
    directory: Arc<ActorDirectory>,
    tokens: Arc<TokenIssuer>,
}

impl UserAuth {
    pub fn new(directory: Arc<ActorDirectory>, tokens: Arc<TokenIssuer>) -> Self {
        Self { directory, tokens }
    }

    /// Register a user and log them in.
    ///
    /// # Steps
    ///
    /// 1. Validate name and email format
    /// 2. Hash the password (bcrypt)
    /// 3. Create the actor with type `user`
    /// 4. Issue a token pair
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        profile: ActorProfile,
        password: &str,
    ) -> Result<TokenResponse, AcError> {
        validate_profile(&profile)?;

        let hash = self.directory.hash_password(password)?;
        let actor = self
            .directory
            .create_actor(profile, Some(hash), ActorType::User)
            .await?;

        self.tokens
            .issue(&TokenPayload::new(actor.actor_id, ActorType::User))
            .await
    }

    /// Log a user in with email and password.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    /// Tokens carry the actor type as persisted.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AcError> {
        if !self.directory.verify_password(email, password).await? {
            tracing::info!(
                target: "actor.services.user_auth",
                email = %hash_for_correlation(email),
                "User login failed"
            );
            return Err(AcError::InvalidCredentials);
        }

        let actor = self
            .directory
            .get_actor_by_email(email)
            .await?
            .ok_or(AcError::InvalidCredentials)?;

        tracing::info!(
            target: "actor.services.user_auth",
            actor = %hash_for_correlation(&actor.actor_id),
            "User logged in"
        );

        self.tokens
            .issue(&TokenPayload::new(actor.actor_id, actor.actor_type))
            .await
    }
}
