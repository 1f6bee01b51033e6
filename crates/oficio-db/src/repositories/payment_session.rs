//! PostgreSQL implementation of PaymentSessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use oficio_core::entities::{PaymentSession, PaymentStatus};
use oficio_core::traits::{PaymentSessionRepository, RepoResult};
use oficio_core::value_objects::Snowflake;

use crate::models::PaymentSessionModel;

use super::error::map_db_error;

const SELECT_COLUMNS: &str =
    "pix_id, quote_id, br_code, br_code_base64, amount_centavos, status, expires_at, created_at";

/// PostgreSQL implementation of PaymentSessionRepository
#[derive(Clone)]
pub struct PgPaymentSessionRepository {
    pool: PgPool,
}

impl PgPaymentSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentSessionRepository for PgPaymentSessionRepository {
    #[instrument(skip(self))]
    async fn find_by_pix_id(&self, pix_id: &str) -> RepoResult<Option<PaymentSession>> {
        let result = sqlx::query_as::<_, PaymentSessionModel>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM payment_sessions
            WHERE pix_id = $1
            "#
        ))
        .bind(pix_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(PaymentSession::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_live_by_quote(
        &self,
        quote_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<PaymentSession>> {
        let result = sqlx::query_as::<_, PaymentSessionModel>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM payment_sessions
            WHERE quote_id = $1 AND status = 'PENDING' AND expires_at > $2
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(quote_id.get())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(PaymentSession::try_from).transpose()
    }

    #[instrument(skip(self, session))]
    async fn create(&self, session: &PaymentSession) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_sessions
                (pix_id, quote_id, br_code, br_code_base64, amount_centavos, status, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&session.pix_id)
        .bind(session.quote_id.get())
        .bind(&session.br_code)
        .bind(&session.br_code_base64)
        .bind(session.amount.centavos())
        .bind(session.status.as_str())
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn settle(&self, pix_id: &str, status: PaymentStatus) -> RepoResult<bool> {
        // Only PENDING sessions settle; a second observer loses the race here
        let result = sqlx::query(
            r#"
            UPDATE payment_sessions
            SET status = $2
            WHERE pix_id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(pix_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_stale_pending(
        &self,
        created_before: DateTime<Utc>,
    ) -> RepoResult<Vec<PaymentSession>> {
        let results = sqlx::query_as::<_, PaymentSessionModel>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM payment_sessions
            WHERE status = 'PENDING' AND created_at < $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(created_before)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(PaymentSession::try_from).collect()
    }
}
