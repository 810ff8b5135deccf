//! Custom test assertions for expressive tests
//!
//! Decodes token segments without verifying the signature, so these check
//! shape and claims only. Signature checks belong to the service under test.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    #[serde(default)]
    pub typ: Option<String>,
}

fn decode_segment<T: serde::de::DeserializeOwned>(token: &str, index: usize, what: &str) -> T {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no {} segment", what));
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT {}: {:?}", what, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT {} JSON: {:?}", what, e))
}

fn claims(token: &str) -> Value {
    decode_segment(token, 1, "payload")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// tokens.access_token
///     .assert_valid_jwt()
///     .assert_actor_type("systemActor")
///     .assert_expires_in(150 * 60);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a three-part HS256 JWT
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the `actorId` claim
    fn assert_for_actor(&self, actor_id: &str) -> &Self;

    /// Assert the `actorType` claim
    fn assert_actor_type(&self, actor_type: &str) -> &Self;

    /// Assert that `exp` is about `seconds` from now (within 60s)
    fn assert_expires_in(&self, seconds: i64) -> &Self;

    /// Assert refresh-token shape: `jti` present, no `actorType`
    fn assert_refresh_shape(&self) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header: JwtHeader = decode_segment(self, 0, "header");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        if let Some(typ) = header.typ {
            assert_eq!(typ, "JWT", "Expected JWT type");
        }

        let claims = claims(self);
        assert!(claims["exp"].is_i64(), "JWT is missing an integer exp");
        assert!(claims["iat"].is_i64(), "JWT is missing an integer iat");
        self
    }

    fn assert_for_actor(&self, actor_id: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims["actorId"].as_str(),
            Some(actor_id),
            "Token is for a different actor"
        );
        self
    }

    fn assert_actor_type(&self, actor_type: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims["actorType"].as_str(),
            Some(actor_type),
            "Token carries a different actor type"
        );
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let exp = claims(self)["exp"]
            .as_i64()
            .expect("JWT is missing an integer exp");
        let remaining = exp - Utc::now().timestamp();
        assert!(
            (remaining - seconds).abs() <= 60,
            "Token expires in {}s, expected about {}s",
            remaining,
            seconds
        );
        self
    }

    fn assert_refresh_shape(&self) -> &Self {
        let claims = claims(self);
        assert!(claims["jti"].is_string(), "Refresh token has no jti");
        assert!(
            claims.get("actorType").is_none(),
            "Refresh token must not carry actorType"
        );
        self
    }
}
