//! Sign-in with an external identity provider.
//!
//! A verified assertion yields an email; the matching actor is logged in, or
//! a `user` actor is created on first sight with no phone, no password and
//! today's date as date of birth.
//!
//! Tokens minted here always carry actor type `user`, whatever the stored
//! record says; federation never grants system-actor tokens.

use crate::errors::AcError;
use crate::models::{ActorProfile, ActorType, TokenPayload, TokenResponse};
use crate::observability::hash_for_correlation;
use crate::services::actor_directory::ActorDirectory;
use crate::services::federation::ExternalAssertionVerifier;
use crate::services::token_service::TokenIssuer;
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

pub struct ThirdPartyAuth {
    directory: Arc<ActorDirectory>,
    tokens: Arc<TokenIssuer>,
    verifier: Arc<dyn ExternalAssertionVerifier>,
}

impl ThirdPartyAuth {
    pub fn new(
        directory: Arc<ActorDirectory>,
        tokens: Arc<TokenIssuer>,
        verifier: Arc<dyn ExternalAssertionVerifier>,
    ) -> Self {
        Self {
            directory,
            tokens,
            verifier,
        }
    }

    /// Exchange an external ID token for a token pair.
    ///
    /// Any failure along the way, including store and signing errors, is
    /// reported as `ExternalAuthFailed`.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, assertion: &str) -> Result<TokenResponse, AcError> {
        self.sign_in(assertion).await.map_err(|e| {
            tracing::warn!(
                target: "actor.services.third_party_auth",
                error = %e,
                "External authentication failed"
            );
            AcError::ExternalAuthFailed
        })
    }

    async fn sign_in(&self, assertion: &str) -> Result<TokenResponse, AcError> {
        let identity = self.verifier.verify(assertion).await?;

        let actor = match self.directory.get_actor_by_email(&identity.email).await? {
            Some(actor) => actor,
            None => {
                let profile = ActorProfile {
                    name: identity.display_name,
                    phone: None,
                    email: identity.email,
                    dob: Utc::now().date_naive(),
                };
                let actor = self
                    .directory
                    .create_actor(profile, None, ActorType::User)
                    .await?;
                tracing::info!(
                    target: "actor.services.third_party_auth",
                    actor = %hash_for_correlation(&actor.actor_id),
                    "Federated user registered"
                );
                actor
            }
        };

        self.tokens
            .issue(&TokenPayload::new(actor.actor_id, ActorType::User))
            .await
    }
}
