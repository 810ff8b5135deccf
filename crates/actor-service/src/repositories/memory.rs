//! In-process stores with the same semantics as the Postgres ones.
//!
//! Useful for embedding the service without a database and for tests.
//! A single lock per store serializes writes, which gives the same outcome
//! as the database's unique constraints under concurrent registration.

use crate::errors::AcError;
use crate::models::{Actor, ActorType, NewActor, RefreshTokenRecord};
use crate::repositories::{ActorStore, RefreshTokenStore, StoredCredential};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryActorStore {
    actors: RwLock<HashMap<String, NewActor>>,
}

impl MemoryActorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored actors.
    pub async fn len(&self) -> usize {
        self.actors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.actors.read().await.is_empty()
    }
}

fn credential_of(actor: &NewActor) -> StoredCredential {
    StoredCredential {
        actor_id: actor.actor_id.clone(),
        actor_type: actor.actor_type,
        credential: actor.credential.clone(),
    }
}

#[async_trait]
impl ActorStore for MemoryActorStore {
    async fn upsert(&self, actor: &NewActor) -> Result<Actor, AcError> {
        let mut actors = self.actors.write().await;

        for other in actors.values().filter(|a| a.actor_id != actor.actor_id) {
            if other.email == actor.email {
                return Err(AcError::Conflict(
                    "An actor with this email already exists".to_string(),
                ));
            }
            if actor.phone.is_some() && other.phone == actor.phone {
                return Err(AcError::Conflict(
                    "An actor with this phone number already exists".to_string(),
                ));
            }
        }

        let mut stored = actor.clone();
        if let Some(existing) = actors.get(&actor.actor_id) {
            stored.credential = existing.credential.clone();
        }
        let created = stored.to_actor();
        actors.insert(stored.actor_id.clone(), stored);
        Ok(created)
    }

    async fn get_by_id(&self, actor_id: &str) -> Result<Option<Actor>, AcError> {
        Ok(self
            .actors
            .read()
            .await
            .get(actor_id)
            .map(NewActor::to_actor))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Actor>, AcError> {
        Ok(self
            .actors
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .map(NewActor::to_actor))
    }

    async fn get_credential_by_email(
        &self,
        email: &str,
        actor_type: ActorType,
    ) -> Result<Option<StoredCredential>, AcError> {
        Ok(self
            .actors
            .read()
            .await
            .values()
            .find(|a| a.email == email && a.actor_type == actor_type)
            .map(credential_of))
    }

    async fn get_credential_by_id(
        &self,
        actor_id: &str,
        actor_type: ActorType,
    ) -> Result<Option<StoredCredential>, AcError> {
        Ok(self
            .actors
            .read()
            .await
            .get(actor_id)
            .filter(|a| a.actor_type == actor_type)
            .map(credential_of))
    }
}

#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    records: RwLock<Vec<RefreshTokenRecord>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, actor_id: &str, refresh_token: &str) -> Result<(), AcError> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.actor_id == actor_id && r.refresh_token == refresh_token)
        {
            return Err(AcError::Database(
                "Failed to store refresh token: duplicate key".to_string(),
            ));
        }

        records.push(RefreshTokenRecord {
            actor_id: actor_id.to_string(),
            refresh_token: refresh_token.to_string(),
            revoked: false,
            issued_at: Utc::now(),
        });
        Ok(())
    }

    async fn has_live_token(&self, actor_id: &str) -> Result<bool, AcError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .any(|r| r.actor_id == actor_id && !r.revoked))
    }

    async fn is_token_live(&self, actor_id: &str, refresh_token: &str) -> Result<bool, AcError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .any(|r| r.actor_id == actor_id && r.refresh_token == refresh_token && !r.revoked))
    }

    async fn revoke_all(&self, actor_id: &str) -> Result<u64, AcError> {
        let mut flipped = 0;
        for record in self
            .records
            .write()
            .await
            .iter_mut()
            .filter(|r| r.actor_id == actor_id && !r.revoked)
        {
            record.revoked = true;
            flipped += 1;
        }
        Ok(flipped)
    }

    async fn list_for_actor(&self, actor_id: &str) -> Result<Vec<RefreshTokenRecord>, AcError> {
        let mut records: Vec<RefreshTokenRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.actor_id == actor_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(records)
    }
}
