//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use oficio_core::entities::Conversation;
use oficio_core::traits::{ConversationRepository, RepoResult};
use oficio_core::value_objects::Snowflake;

use crate::models::ConversationModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, client_id, professional_id, service_id, last_message_at, created_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_by_key(
        &self,
        client_id: Snowflake,
        professional_id: Snowflake,
        service_id: Option<Snowflake>,
    ) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, client_id, professional_id, service_id, last_message_at, created_at
            FROM conversations
            WHERE client_id = $1 AND professional_id = $2 AND service_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(client_id.get())
        .bind(professional_id.get())
        .bind(service_id.map(Snowflake::get))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Conversation>> {
        let results = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, client_id, professional_id, service_id, last_message_at, created_at
            FROM conversations
            WHERE client_id = $1 OR professional_id = $1
            ORDER BY last_message_at DESC NULLS LAST, id DESC
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Conversation::from).collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, client_id, professional_id, service_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(conversation.id.get())
        .bind(conversation.client_id.get())
        .bind(conversation.professional_id.get())
        .bind(conversation.service_id.map(Snowflake::get))
        .bind(conversation.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                oficio_core::DomainError::ValidationError(
                    "conversation already exists for this contact".to_string(),
                )
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn touch_last_message(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        // GREATEST keeps the invariant when deliveries land out of order
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_at = GREATEST(COALESCE(last_message_at, 'epoch'::timestamptz), $2)
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_last_message(&self, id: Snowflake, at: Option<DateTime<Utc>>) -> RepoResult<()> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_watermark(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conversation_clears (conversation_id, user_id, cleared_before)
            VALUES ($1, $2, $3)
            ON CONFLICT (conversation_id, user_id)
            DO UPDATE SET cleared_before = GREATEST(conversation_clears.cleared_before, EXCLUDED.cleared_before)
            "#,
        )
        .bind(conversation_id.get())
        .bind(user_id.get())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn watermark(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<DateTime<Utc>>> {
        let result: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT cleared_before
            FROM conversation_clears
            WHERE conversation_id = $1 AND user_id = $2
            "#,
        )
        .bind(conversation_id.get())
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(|(at,)| at))
    }
}
