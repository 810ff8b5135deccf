//! Builder patterns for test tokens
//!
//! Provides fluent APIs for minting access tokens with arbitrary timestamps
//! and Google-style ID tokens signed with the fixture RSA keys.

use crate::crypto_fixtures::{TEST_JWT_SECRET, TEST_RSA_OTHER_PEM, TEST_RSA_PRIMARY_PEM};
use crate::test_ids::{TEST_GOOGLE_CLIENT_ID, TEST_GOOGLE_ISSUER, TEST_KEY_ID_PRIMARY};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for HS256 access tokens in the service's claim format
///
/// # Example
/// ```rust,ignore
/// let expired = TestTokenBuilder::new()
///     .for_actor("abc123")
///     .issued_at(now - 10_000)
///     .expires_at(now - 1_000)
///     .build();
/// ```
pub struct TestTokenBuilder {
    actor_id: String,
    actor_type: Option<String>,
    jti: Option<String>,
    exp: i64,
    iat: i64,
    secret: String,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            actor_id: "test-actor".to_string(),
            actor_type: Some("user".to_string()),
            jti: None,
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
            secret: TEST_JWT_SECRET.to_string(),
        }
    }

    pub fn for_actor(mut self, actor_id: &str) -> Self {
        self.actor_id = actor_id.to_string();
        self
    }

    /// Set the `actorType` claim, or drop it with `None`
    pub fn with_actor_type(mut self, actor_type: Option<&str>) -> Self {
        self.actor_type = actor_type.map(str::to_string);
        self
    }

    /// Shape the claims like a refresh token: `jti` set, no `actorType`
    pub fn as_refresh(mut self, jti: &str) -> Self {
        self.jti = Some(jti.to_string());
        self.actor_type = None;
        self
    }

    /// Set expiration in seconds from now (negative for the past)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Sign with a different HS256 secret
    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    /// Build the claims as a JSON value
    pub fn build_claims(&self) -> Value {
        let mut claims = Map::new();
        claims.insert("actorId".to_string(), json!(self.actor_id));
        if let Some(actor_type) = &self.actor_type {
            claims.insert("actorType".to_string(), json!(actor_type));
        }
        if let Some(jti) = &self.jti {
            claims.insert("jti".to_string(), json!(jti));
        }
        claims.insert("iat".to_string(), json!(self.iat));
        claims.insert("exp".to_string(), json!(self.exp));
        Value::Object(claims)
    }

    /// Build and sign the token
    pub fn build(self) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &self.build_claims(),
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("HS256 signing with a fixed secret cannot fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for RS256 ID tokens shaped like Google's
///
/// Defaults produce a token the verifier accepts when it is configured with
/// `TEST_GOOGLE_CLIENT_ID` and serves `primary_jwks(TEST_KEY_ID_PRIMARY)`.
pub struct GoogleIdTokenBuilder {
    kid: Option<String>,
    use_other_key: bool,
    aud: String,
    iss: String,
    email: Option<String>,
    name: Option<String>,
    exp: i64,
    iat: i64,
}

impl GoogleIdTokenBuilder {
    pub fn new(email: &str) -> Self {
        let now = Utc::now();
        Self {
            kid: Some(TEST_KEY_ID_PRIMARY.to_string()),
            use_other_key: false,
            aud: TEST_GOOGLE_CLIENT_ID.to_string(),
            iss: TEST_GOOGLE_ISSUER.to_string(),
            email: Some(email.to_string()),
            name: None,
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_kid(mut self, kid: Option<&str>) -> Self {
        self.kid = kid.map(str::to_string);
        self
    }

    /// Sign with the unpublished fixture key instead of the primary one
    pub fn signed_by_other_key(mut self) -> Self {
        self.use_other_key = true;
        self
    }

    pub fn with_audience(mut self, aud: &str) -> Self {
        self.aud = aud.to_string();
        self
    }

    pub fn with_issuer(mut self, iss: &str) -> Self {
        self.iss = iss.to_string();
        self
    }

    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Build and sign the token
    pub fn build(self) -> String {
        let mut claims = Map::new();
        claims.insert("aud".to_string(), json!(self.aud));
        claims.insert("iss".to_string(), json!(self.iss));
        claims.insert("sub".to_string(), json!("1234567890"));
        claims.insert("iat".to_string(), json!(self.iat));
        claims.insert("exp".to_string(), json!(self.exp));
        if let Some(email) = self.email {
            claims.insert("email".to_string(), json!(email));
            claims.insert("email_verified".to_string(), json!(true));
        }
        if let Some(name) = self.name {
            claims.insert("name".to_string(), json!(name));
        }

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.kid;

        let pem = if self.use_other_key {
            TEST_RSA_OTHER_PEM
        } else {
            TEST_RSA_PRIMARY_PEM
        };
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture PEM is valid");

        encode(&header, &Value::Object(claims), &key).expect("RS256 signing failed")
    }
}
