//! PostgreSQL implementation of QuoteRepository
//!
//! Transition methods write against the expected prior state in the WHERE
//! clause. Zero rows affected means the guard failed: either the quote is
//! gone or a concurrent caller won the race. The service layer re-reads to
//! tell the two apart, so no transition ever produces a partial write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use oficio_core::entities::{Quote, QuoteStatus};
use oficio_core::traits::{QuoteRepository, RepoResult};
use oficio_core::value_objects::Snowflake;

use crate::models::QuoteModel;

use super::error::map_db_error;

const SELECT_COLUMNS: &str = "id, conversation_id, professional_id, client_id, title, \
                              price_centavos, status, response_text, completed_at, \
                              client_confirmed, pix_id, created_at, updated_at";

/// PostgreSQL implementation of QuoteRepository
#[derive(Clone)]
pub struct PgQuoteRepository {
    pool: PgPool,
}

impl PgQuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteRepository for PgQuoteRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Quote>> {
        let result = sqlx::query_as::<_, QuoteModel>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM quotes
            WHERE id = $1
            "#
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Quote::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<Vec<Quote>> {
        let results = sqlx::query_as::<_, QuoteModel>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM quotes
            WHERE conversation_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(conversation_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Quote::try_from).collect()
    }

    #[instrument(skip(self, quote))]
    async fn create(&self, quote: &Quote) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO quotes
                (id, conversation_id, professional_id, client_id, title, price_centavos,
                 status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(quote.id.get())
        .bind(quote.conversation_id.get())
        .bind(quote.professional_id.get())
        .bind(quote.client_id.get())
        .bind(&quote.title)
        .bind(quote.price.centavos())
        .bind(quote.status.as_str())
        .bind(quote.created_at)
        .bind(quote.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn transition_status(
        &self,
        id: Snowflake,
        expected: QuoteStatus,
        next: QuoteStatus,
        response_text: Option<&str>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET status = $3, response_text = COALESCE($4, response_text), updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.get())
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(response_text)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_completed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET completed_at = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'accepted' AND completed_at IS NULL
            "#,
        )
        .bind(id.get())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn attach_pix(&self, id: Snowflake, pix_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET pix_id = $2, updated_at = NOW()
            WHERE id = $1
              AND status = 'accepted'
              AND completed_at IS NOT NULL
              AND client_confirmed = FALSE
            "#,
        )
        .bind(id.get())
        .bind(pix_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn confirm_paid(&self, id: Snowflake, pix_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET client_confirmed = TRUE, updated_at = NOW()
            WHERE id = $1
              AND pix_id = $2
              AND status = 'accepted'
              AND completed_at IS NOT NULL
              AND client_confirmed = FALSE
            "#,
        )
        .bind(id.get())
        .bind(pix_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_stale_pending(&self, created_before: DateTime<Utc>) -> RepoResult<Vec<Quote>> {
        let results = sqlx::query_as::<_, QuoteModel>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM quotes
            WHERE status = 'pending' AND created_at < $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(created_before)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Quote::try_from).collect()
    }
}
