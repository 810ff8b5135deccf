//! Postgres-backed refresh-token ledger.

use crate::errors::AcError;
use crate::models::RefreshTokenRecord;
use crate::observability::metrics::record_db_query;
use crate::repositories::RefreshTokenStore;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;

/// Refresh-token ledger over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn insert(&self, actor_id: &str, refresh_token: &str) -> Result<(), AcError> {
        let start = Instant::now();
        let result = sqlx::query(
            r#"
            INSERT INTO refresh_tokens (actor_id, refresh_token)
            VALUES ($1, $2)
            "#,
        )
        .bind(actor_id)
        .bind(refresh_token)
        .execute(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("insert", "refresh_tokens", status, start.elapsed());

        result.map_err(|e| AcError::Database(format!("Failed to store refresh token: {}", e)))?;
        Ok(())
    }

    async fn has_live_token(&self, actor_id: &str) -> Result<bool, AcError> {
        let start = Instant::now();
        let result: Result<(bool,), _> = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM refresh_tokens
                WHERE actor_id = $1 AND revoked = FALSE
            )
            "#,
        )
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("select", "refresh_tokens", status, start.elapsed());

        let (live,) = result
            .map_err(|e| AcError::Database(format!("Failed to check refresh tokens: {}", e)))?;
        Ok(live)
    }

    async fn is_token_live(&self, actor_id: &str, refresh_token: &str) -> Result<bool, AcError> {
        let start = Instant::now();
        let result: Result<(bool,), _> = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM refresh_tokens
                WHERE actor_id = $1 AND refresh_token = $2 AND revoked = FALSE
            )
            "#,
        )
        .bind(actor_id)
        .bind(refresh_token)
        .fetch_one(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("select", "refresh_tokens", status, start.elapsed());

        let (live,) = result
            .map_err(|e| AcError::Database(format!("Failed to check refresh token: {}", e)))?;
        Ok(live)
    }

    async fn revoke_all(&self, actor_id: &str) -> Result<u64, AcError> {
        let start = Instant::now();
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE actor_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(actor_id)
        .execute(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("update", "refresh_tokens", status, start.elapsed());

        let done = result
            .map_err(|e| AcError::Database(format!("Failed to revoke refresh tokens: {}", e)))?;
        Ok(done.rows_affected())
    }

    async fn list_for_actor(&self, actor_id: &str) -> Result<Vec<RefreshTokenRecord>, AcError> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT actor_id, refresh_token, revoked, issued_at
            FROM refresh_tokens
            WHERE actor_id = $1
            ORDER BY issued_at DESC
            "#,
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_db_query("select", "refresh_tokens", status, start.elapsed());

        result.map_err(|e| AcError::Database(format!("Failed to list refresh tokens: {}", e)))
    }
}
