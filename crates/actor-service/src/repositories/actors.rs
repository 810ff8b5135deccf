//! Postgres-backed actor store.

use crate::errors::AcError;
use crate::models::{Actor, ActorType, NewActor};
use crate::observability::metrics::record_db_query;
use crate::repositories::{ActorStore, StoredCredential};
use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Instant;

/// Actor row (maps to actors table, credential excluded)
#[derive(Debug, sqlx::FromRow)]
struct ActorRow {
    actor_id: String,
    name: String,
    phone: Option<String>,
    email: String,
    dob: NaiveDate,
    actor_type: String,
}

impl TryFrom<ActorRow> for Actor {
    type Error = AcError;

    fn try_from(row: ActorRow) -> Result<Self, Self::Error> {
        Ok(Actor {
            actor_type: parse_actor_type(&row.actor_type)?,
            actor_id: row.actor_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            dob: row.dob,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    actor_id: String,
    actor_type: String,
    credential: Option<String>,
}

impl TryFrom<CredentialRow> for StoredCredential {
    type Error = AcError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(StoredCredential {
            actor_type: parse_actor_type(&row.actor_type)?,
            actor_id: row.actor_id,
            credential: row.credential.map(SecretString::from),
        })
    }
}

fn parse_actor_type(raw: &str) -> Result<ActorType, AcError> {
    ActorType::from_str(raw).map_err(|e| AcError::Database(format!("Corrupt actor row: {}", e)))
}

/// Map an insert/update failure, turning unique violations into conflicts.
fn map_write_error(e: sqlx::Error) -> AcError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("actors_email_unique") => "An actor with this email already exists",
                Some("actors_phone_unique") => "An actor with this phone number already exists",
                _ => "Actor already exists",
            };
            return AcError::Conflict(message.to_string());
        }
    }
    AcError::Database(format!("Failed to upsert actor: {}", e))
}

/// Actor store over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgActorStore {
    pool: PgPool,
}

impl PgActorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorStore for PgActorStore {
    async fn upsert(&self, actor: &NewActor) -> Result<Actor, AcError> {
        let start = Instant::now();
        let credential = actor.credential.as_ref().map(|c| c.expose_secret());

        let result = sqlx::query_as::<_, ActorRow>(
            r#"
            INSERT INTO actors (actor_id, name, phone, email, credential, dob, actor_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (actor_id) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                dob = EXCLUDED.dob,
                actor_type = EXCLUDED.actor_type,
                updated_at = NOW()
            RETURNING actor_id, name, phone, email, dob, actor_type
            "#,
        )
        .bind(&actor.actor_id)
        .bind(&actor.name)
        .bind(actor.phone.as_deref())
        .bind(&actor.email)
        .bind(credential)
        .bind(actor.dob)
        .bind(actor.actor_type.as_str())
        .fetch_one(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("upsert", "actors", status, start.elapsed());

        result.map_err(map_write_error)?.try_into()
    }

    async fn get_by_id(&self, actor_id: &str) -> Result<Option<Actor>, AcError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, ActorRow>(
            r#"
            SELECT actor_id, name, phone, email, dob, actor_type
            FROM actors
            WHERE actor_id = $1
            "#,
        )
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("select", "actors", status, start.elapsed());

        result
            .map_err(|e| AcError::Database(format!("Failed to fetch actor by id: {}", e)))?
            .map(Actor::try_from)
            .transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Actor>, AcError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, ActorRow>(
            r#"
            SELECT actor_id, name, phone, email, dob, actor_type
            FROM actors
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("select", "actors", status, start.elapsed());

        result
            .map_err(|e| AcError::Database(format!("Failed to fetch actor by email: {}", e)))?
            .map(Actor::try_from)
            .transpose()
    }

    async fn get_credential_by_email(
        &self,
        email: &str,
        actor_type: ActorType,
    ) -> Result<Option<StoredCredential>, AcError> {
        let start = Instant::now();

        let result = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT actor_id, actor_type, credential
            FROM actors
            WHERE email = $1 AND actor_type = $2
            "#,
        )
        .bind(email)
        .bind(actor_type.as_str())
        .fetch_optional(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("select", "actors", status, start.elapsed());

        result
            .map_err(|e| AcError::Database(format!("Failed to fetch credential: {}", e)))?
            .map(StoredCredential::try_from)
            .transpose()
    }

    async fn get_credential_by_id(
        &self,
        actor_id: &str,
        actor_type: ActorType,
    ) -> Result<Option<StoredCredential>, AcError> {
        let start = Instant::now();

        let result = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT actor_id, actor_type, credential
            FROM actors
            WHERE actor_id = $1 AND actor_type = $2
            "#,
        )
        .bind(actor_id)
        .bind(actor_type.as_str())
        .fetch_optional(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("select", "actors", status, start.elapsed());

        result
            .map_err(|e| AcError::Database(format!("Failed to fetch credential: {}", e)))?
            .map(StoredCredential::try_from)
            .transpose()
    }
}
