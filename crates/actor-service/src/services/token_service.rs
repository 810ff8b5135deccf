//! Token issuance, verification, refresh and revocation.
//!
//! Access tokens carry `{actorId, actorType}` and live 150 minutes. Refresh
//! tokens carry `{actorId, jti}` and live 7 days. Both are HS256 under the
//! one process-wide secret. Every issued refresh token is appended to the
//! ledger before the pair is returned.
//!
//! Refresh is authorized by "any live ledger record for this actor", not by
//! presenting a specific refresh token, and does not revoke earlier records.

use crate::crypto::{self, AccessClaims, JwtKeys, RefreshClaims};
use crate::errors::AcError;
use crate::models::{TokenPayload, TokenResponse};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{
    record_token_issued, record_token_validation, record_tokens_revoked,
};
use crate::repositories::RefreshTokenStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Access token lifetime (150 minutes).
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 150 * 60;

/// Refresh token lifetime (7 days).
pub const REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

pub struct TokenIssuer {
    keys: JwtKeys,
    ledger: Arc<dyn RefreshTokenStore>,
    clock_skew_seconds: i64,
}

impl TokenIssuer {
    pub fn new(
        jwt_secret: &[u8],
        ledger: Arc<dyn RefreshTokenStore>,
        clock_skew_seconds: i64,
    ) -> Self {
        Self {
            keys: JwtKeys::from_secret(jwt_secret),
            ledger,
            clock_skew_seconds,
        }
    }

    /// Mint an access/refresh pair and record the refresh token.
    ///
    /// A ledger failure fails the issuance; no pair is returned.
    #[instrument(skip_all, fields(actor_type = %payload.actor_type))]
    pub async fn issue(&self, payload: &TokenPayload) -> Result<TokenResponse, AcError> {
        let now = Utc::now().timestamp();

        let access = AccessClaims {
            actor_id: payload.actor_id.clone(),
            actor_type: payload.actor_type,
            iat: now,
            exp: now + ACCESS_TOKEN_TTL_SECONDS,
        };
        let refresh = RefreshClaims {
            actor_id: payload.actor_id.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + REFRESH_TOKEN_TTL_SECONDS,
        };

        let access_token = crypto::sign_jwt(&access, &self.keys)?;
        let refresh_token = crypto::sign_jwt(&refresh, &self.keys)?;

        self.ledger
            .insert(&payload.actor_id, &refresh_token)
            .await?;

        record_token_issued(payload.actor_type.as_str());
        tracing::debug!(
            target: "actor.services.token",
            actor = %hash_for_correlation(&payload.actor_id),
            "Token pair issued"
        );

        Ok(TokenResponse {
            access_token,
            refresh_token,
        })
    }

    /// Verify signature and expiry of an access token. Never reads the ledger.
    #[instrument(skip_all)]
    pub fn verify_access(&self, access_token: &str) -> Result<TokenPayload, AcError> {
        match crypto::verify_jwt::<AccessClaims>(
            access_token,
            &self.keys,
            true,
            self.clock_skew_seconds,
        ) {
            Ok(claims) => {
                record_token_validation("success", None);
                Ok(TokenPayload::new(claims.actor_id, claims.actor_type))
            }
            Err(e) => {
                record_token_validation("error", Some("cryptographic"));
                Err(e)
            }
        }
    }

    /// Decode an access token with a valid signature, expired or not.
    fn decode_ignoring_expiry(&self, access_token: &str) -> Result<AccessClaims, AcError> {
        crypto::verify_jwt::<AccessClaims>(
            access_token,
            &self.keys,
            false,
            self.clock_skew_seconds,
        )
    }

    /// Exchange a possibly expired access token for a new pair.
    ///
    /// Fails with `InvalidToken` on a bad signature and `RefreshDenied` when
    /// the actor has no live refresh record. Earlier records stay live.
    #[instrument(skip_all)]
    pub async fn refresh(&self, access_token: &str) -> Result<TokenResponse, AcError> {
        let claims = self.decode_ignoring_expiry(access_token)?;

        if !self.ledger.has_live_token(&claims.actor_id).await? {
            tracing::info!(
                target: "actor.services.token",
                actor = %hash_for_correlation(&claims.actor_id),
                "Refresh denied: no live refresh token"
            );
            return Err(AcError::RefreshDenied);
        }

        self.issue(&TokenPayload::new(claims.actor_id, claims.actor_type))
            .await
    }

    /// Revoke every refresh record for the actor. Idempotent.
    #[instrument(skip_all)]
    pub async fn revoke(&self, actor_id: &str) -> Result<(), AcError> {
        let revoked = self.ledger.revoke_all(actor_id).await?;
        record_tokens_revoked(revoked);

        tracing::info!(
            target: "actor.services.token",
            actor = %hash_for_correlation(actor_id),
            revoked = revoked,
            "Refresh tokens revoked"
        );
        Ok(())
    }

    /// Read the payload out of a pair this service issued.
    ///
    /// Checks the access token's signature but not its expiry, and does not
    /// consult the ledger.
    pub fn payload_of(&self, tokens: &TokenResponse) -> Result<TokenPayload, AcError> {
        let claims = self.decode_ignoring_expiry(&tokens.access_token)?;
        Ok(TokenPayload::new(claims.actor_id, claims.actor_type))
    }

    /// True when this refresh token was issued to the actor and is not revoked.
    ///
    /// The token must also carry a valid signature and name the same actor.
    #[instrument(skip_all)]
    pub async fn is_refresh_token_live(
        &self,
        actor_id: &str,
        refresh_token: &str,
    ) -> Result<bool, AcError> {
        let claims = match crypto::verify_jwt::<RefreshClaims>(
            refresh_token,
            &self.keys,
            true,
            self.clock_skew_seconds,
        ) {
            Ok(claims) => claims,
            Err(_) => return Ok(false),
        };
        if claims.actor_id != actor_id {
            return Ok(false);
        }
        self.ledger.is_token_live(actor_id, refresh_token).await
    }
}
