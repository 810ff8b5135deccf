use chrono::{DateTime, NaiveDate, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Actor class carried through every interface and embedded in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorType {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "systemActor")]
    SystemActor,
}

impl ActorType {
    /// Persisted and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::User => "user",
            ActorType::SystemActor => "systemActor",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ActorType::User),
            "systemActor" => Ok(ActorType::SystemActor),
            _ => Err(format!("Invalid actor type: {}", s)),
        }
    }
}

/// Actor record as returned by read operations.
///
/// The stored credential is not part of this type; it only travels through
/// [`NewActor`] on the way in and through the store's credential lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub actor_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub dob: NaiveDate,
    pub actor_type: ActorType,
}

/// Profile fields supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub dob: NaiveDate,
}

/// Actor record on its way into the store, credential included.
#[derive(Debug, Clone)]
pub struct NewActor {
    pub actor_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    /// Bcrypt hash for users, raw pre-shared secret for system actors,
    /// `None` for federated users.
    pub credential: Option<SecretString>,
    pub dob: NaiveDate,
    pub actor_type: ActorType,
}

impl NewActor {
    /// Read view of this record, without the credential.
    pub fn to_actor(&self) -> Actor {
        Actor {
            actor_id: self.actor_id.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            dob: self.dob,
            actor_type: self.actor_type,
        }
    }
}

/// Identity claim sealed inside an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub actor_id: String,
    pub actor_type: ActorType,
}

impl TokenPayload {
    pub fn new(actor_id: impl Into<String>, actor_type: ActorType) -> Self {
        Self {
            actor_id: actor_id.into(),
            actor_type,
        }
    }
}

/// Access and refresh token pair returned by every issuance.
///
/// Debug is manually implemented so neither token reaches logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Refresh-token ledger entry (maps to refresh_tokens table)
#[derive(Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub actor_id: String,
    pub refresh_token: String,
    pub revoked: bool,
    pub issued_at: DateTime<Utc>,
}

impl fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("actor_id", &self.actor_id)
            .field("refresh_token", &"[REDACTED]")
            .field("revoked", &self.revoked)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Identity asserted by an external provider after verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub email: String,
    pub display_name: String,
}
