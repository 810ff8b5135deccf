//! Library facade over the authentication strategies and the token service.
//!
//! Every operation is timed and counted under
//! `actor_operation_duration_seconds{operation, status}`; failures additionally
//! bump `actor_errors_total` with their category and code.

use crate::config::Config;
use crate::errors::AcError;
use crate::models::{ActorProfile, TokenPayload, TokenResponse};
use crate::observability::metrics::{record_error, record_operation};
use crate::observability::ErrorCategory;
use crate::repositories::actors::PgActorStore;
use crate::repositories::refresh_tokens::PgRefreshTokenStore;
use crate::repositories::{apply_migrations, connect_pool, ActorStore, RefreshTokenStore};
use crate::services::{
    ActorDirectory, BcryptHasher, ExternalAssertionVerifier, GoogleIdTokenVerifier, SecretHasher,
    SystemAuth, ThirdPartyAuth, TokenIssuer, UserAuth,
};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The collaborators an [`ActorAuth`] runs over.
pub struct ActorAuthParts {
    pub actors: Arc<dyn ActorStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub hasher: Arc<dyn SecretHasher>,
    /// `None` disables federated sign-in.
    pub assertion_verifier: Option<Arc<dyn ExternalAssertionVerifier>>,
}

pub struct ActorAuth {
    directory: Arc<ActorDirectory>,
    tokens: Arc<TokenIssuer>,
    user_auth: UserAuth,
    system_auth: SystemAuth,
    third_party_auth: Option<ThirdPartyAuth>,
}

impl ActorAuth {
    /// Assemble the service from explicit parts.
    ///
    /// The token signing secret and clock skew come from `config`; its
    /// database and identity-provider settings are ignored.
    pub fn from_parts(config: &Config, parts: ActorAuthParts) -> Self {
        let directory = Arc::new(ActorDirectory::new(parts.actors, parts.hasher));
        let tokens = Arc::new(TokenIssuer::new(
            config.jwt_secret_bytes(),
            parts.refresh_tokens,
            config.jwt_clock_skew_seconds,
        ));

        let third_party_auth = parts
            .assertion_verifier
            .map(|verifier| ThirdPartyAuth::new(directory.clone(), tokens.clone(), verifier));

        Self {
            user_auth: UserAuth::new(directory.clone(), tokens.clone()),
            system_auth: SystemAuth::new(directory.clone(), tokens.clone()),
            third_party_auth,
            directory,
            tokens,
        }
    }

    /// Connect to Postgres, ensure the schema exists, and assemble the
    /// service over the database-backed stores.
    ///
    /// Google sign-in is enabled when `GOOGLE_CLIENT_ID` is configured.
    pub async fn connect(config: &Config) -> Result<Self, AcError> {
        let pool = connect_pool(config).await.map_err(|e| {
            error!(target: "actor.auth", error = %e, "Database connection failed");
            e
        })?;
        apply_migrations(&pool).await?;

        let assertion_verifier = google_verifier(config);

        info!(
            target: "actor.auth",
            bcrypt_cost = config.bcrypt_cost,
            google_enabled = assertion_verifier.is_some(),
            "Actor authentication initialized"
        );

        Ok(Self::from_parts(
            config,
            ActorAuthParts {
                actors: Arc::new(PgActorStore::new(pool.clone())),
                refresh_tokens: Arc::new(PgRefreshTokenStore::new(pool)),
                hasher: Arc::new(BcryptHasher::new(config.bcrypt_cost)),
                assertion_verifier,
            },
        ))
    }

    /// Read access to actor records.
    pub fn directory(&self) -> &ActorDirectory {
        &self.directory
    }

    pub async fn register_user(
        &self,
        profile: ActorProfile,
        password: &str,
    ) -> Result<TokenResponse, AcError> {
        let start = Instant::now();
        let result = self.user_auth.register(profile, password).await;
        observe("register_user", start, result)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<TokenResponse, AcError> {
        let start = Instant::now();
        let result = self.user_auth.login(email, password).await;
        observe("login_user", start, result)
    }

    pub async fn register_system_actor(
        &self,
        profile: ActorProfile,
        system_secret: SecretString,
    ) -> Result<TokenResponse, AcError> {
        let start = Instant::now();
        let result = self.system_auth.register(profile, system_secret).await;
        observe("register_system_actor", start, result)
    }

    pub async fn authenticate_system_actor(
        &self,
        actor_id: &str,
        system_secret: &str,
    ) -> Result<TokenResponse, AcError> {
        let start = Instant::now();
        let result = self.system_auth.authenticate(actor_id, system_secret).await;
        observe("authenticate_system_actor", start, result)
    }

    /// Sign in with a Google ID token.
    ///
    /// Fails with `Configuration` when no Google client ID was configured.
    pub async fn authenticate_with_google(&self, id_token: &str) -> Result<TokenResponse, AcError> {
        let start = Instant::now();
        let result = match &self.third_party_auth {
            Some(auth) => auth.authenticate(id_token).await,
            None => Err(AcError::Configuration(
                "GOOGLE_CLIENT_ID is not configured".to_string(),
            )),
        };
        observe("authenticate_with_google", start, result)
    }

    pub fn validate_access_token(&self, access_token: &str) -> Result<TokenPayload, AcError> {
        let start = Instant::now();
        let result = self.tokens.verify_access(access_token);
        observe("validate_access_token", start, result)
    }

    /// Issue a fresh pair from an access token, which may be expired.
    pub async fn refresh_access_token(&self, access_token: &str) -> Result<TokenResponse, AcError> {
        let start = Instant::now();
        let result = self.tokens.refresh(access_token).await;
        observe("refresh_access_token", start, result)
    }

    /// Revoke every refresh token recorded for the actor.
    pub async fn revoke_refresh_token(&self, actor_id: &str) -> Result<(), AcError> {
        let start = Instant::now();
        let result = self.tokens.revoke(actor_id).await;
        observe("revoke_refresh_token", start, result)
    }

    pub fn payload_from_token_response(
        &self,
        tokens: &TokenResponse,
    ) -> Result<TokenPayload, AcError> {
        let start = Instant::now();
        let result = self.tokens.payload_of(tokens);
        observe("payload_from_token_response", start, result)
    }

    /// Whether this specific refresh token is recorded for the actor and
    /// has not been revoked.
    pub async fn is_refresh_token_live(
        &self,
        actor_id: &str,
        refresh_token: &str,
    ) -> Result<bool, AcError> {
        let start = Instant::now();
        let result = self
            .tokens
            .is_refresh_token_live(actor_id, refresh_token)
            .await;
        observe("is_refresh_token_live", start, result)
    }
}

/// Google ID token verifier for the configured client ID, or `None` when
/// federated sign-in is not configured.
fn google_verifier(config: &Config) -> Option<Arc<dyn ExternalAssertionVerifier>> {
    match config.require_google_client_id() {
        Ok(client_id) => Some(Arc::new(GoogleIdTokenVerifier::new(client_id.to_string()))
            as Arc<dyn ExternalAssertionVerifier>),
        Err(e) => {
            info!(target: "actor.auth", reason = %e, "Google sign-in disabled");
            None
        }
    }
}

fn observe<T>(
    operation: &'static str,
    start: Instant,
    result: Result<T, AcError>,
) -> Result<T, AcError> {
    match &result {
        Ok(_) => record_operation(operation, "success", start.elapsed()),
        Err(e) => {
            record_operation(operation, "error", start.elapsed());
            record_error(operation, ErrorCategory::from(e).as_str(), e.code());
            if !e.is_client_error() {
                error!(target: "actor.auth", operation, error = %e, "Operation failed");
            }
        }
    }
    result
}
