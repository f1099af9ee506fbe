//! Postgres-backed revocation store.

use actix_middleware::{RevocationStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

pub struct PgRevocationStore {
    db: PgPool,
}

impl PgRevocationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM token_revocations WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_one(&self.db)
        .await
        .map_err(backend)?;

        let n: i64 = row.try_get("n").map_err(backend)?;
        Ok(n > 0)
    }

    async fn revoke(
        &self,
        token: &str,
        subject_id: i64,
        expires_at: DateTime<Utc>,
        reason: Option<&str>,
    ) -> Result<(), StoreError> {
        // First revocation wins; the primary key makes duplicates a no-op
        sqlx::query(
            "INSERT INTO token_revocations (token, subject_id, expires_at, reason) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(token)
        .bind(subject_id)
        .bind(expires_at)
        .bind(reason)
        .execute(&self.db)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn revoke_all_for_subject(&self, subject_id: i64) -> Result<(), StoreError> {
        // No subject-to-token index exists; outstanding tokens stay valid
        // until their natural expiry. Recorded for the audit trail only.
        tracing::warn!(subject_id, "all tokens invalidated for subject (audit only)");
        Ok(())
    }

    async fn sweep(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM token_revocations WHERE expires_at <= NOW()")
            .execute(&self.db)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected())
    }
}
