//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use oficio_core::entities::Message;
use oficio_core::traits::{MessagePage, MessageRepository, RepoResult};
use oficio_core::value_objects::Snowflake;

use crate::models::MessageModel;

use super::error::{map_db_error, message_not_found};

const SELECT_COLUMNS: &str = "id, conversation_id, sender_id, content, kind, file_url, \
                              file_name, reply_to_id, created_at, read_at, deleted_at";

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_rows(rows: Vec<MessageModel>) -> RepoResult<Vec<Message>> {
        rows.into_iter().map(Message::try_from).collect()
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM messages
            WHERE id = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
        page: MessagePage,
    ) -> RepoResult<Vec<Message>> {
        let limit = page.limit.clamp(1, 100);

        let results = match (page.before, page.after) {
            (Some(before), None) => {
                // Scrolling up through history
                sqlx::query_as::<_, MessageModel>(&format!(
                    r#"
                    SELECT {SELECT_COLUMNS}
                    FROM messages
                    WHERE conversation_id = $1 AND id < $2 AND deleted_at IS NULL
                    ORDER BY id DESC
                    LIMIT $3
                    "#
                ))
                .bind(conversation_id.get())
                .bind(before.get())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            (None, Some(after)) => {
                // Catching up on newer messages
                sqlx::query_as::<_, MessageModel>(&format!(
                    r#"
                    SELECT {SELECT_COLUMNS}
                    FROM messages
                    WHERE conversation_id = $1 AND id > $2 AND deleted_at IS NULL
                    ORDER BY id ASC
                    LIMIT $3
                    "#
                ))
                .bind(conversation_id.get())
                .bind(after.get())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            _ => {
                // Latest page
                sqlx::query_as::<_, MessageModel>(&format!(
                    r#"
                    SELECT {SELECT_COLUMNS}
                    FROM messages
                    WHERE conversation_id = $1 AND deleted_at IS NULL
                    ORDER BY id DESC
                    LIMIT $2
                    "#
                ))
                .bind(conversation_id.get())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;

        Self::map_rows(results)
    }

    #[instrument(skip(self))]
    async fn find_all(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM messages
            WHERE conversation_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(conversation_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::map_rows(results)
    }

    #[instrument(skip(self, message))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages
                (id, conversation_id, sender_id, content, kind, file_url, file_name, reply_to_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(message.id.get())
        .bind(message.conversation_id.get())
        .bind(message.sender_id.get())
        .bind(&message.content)
        .bind(message.kind.as_str())
        .bind(message.file_url.as_deref())
        .bind(message.file_name.as_deref())
        .bind(message.reply_to_id.map(Snowflake::get))
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest_created_at(
        &self,
        conversation_id: Snowflake,
    ) -> RepoResult<Option<DateTime<Utc>>> {
        let (latest,): (Option<DateTime<Utc>>,) = sqlx::query_as(
            r#"
            SELECT MAX(created_at)
            FROM messages
            WHERE conversation_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(conversation_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(latest)
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        reader_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = $3
            WHERE conversation_id = $1
              AND sender_id <> $2
              AND read_at IS NULL
              AND deleted_at IS NULL
            "#,
        )
        .bind(conversation_id.get())
        .bind(reader_id.get())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn count_unread_total(&self, user_id: Snowflake) -> RepoResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.client_id = $1 OR c.professional_id = $1)
              AND m.sender_id <> $1
              AND m.read_at IS NULL
              AND m.deleted_at IS NULL
            "#,
        )
        .bind(user_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn count_unread_by_conversation(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<(Snowflake, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT m.conversation_id, COUNT(*)
            FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.client_id = $1 OR c.professional_id = $1)
              AND m.sender_id <> $1
              AND m.read_at IS NULL
              AND m.deleted_at IS NULL
            GROUP BY m.conversation_id
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (Snowflake::new(id), count))
            .collect())
    }
}
