//! Read tracker
//!
//! Marking is batched per conversation visit: one call stamps every unread
//! message the caller did not send. The unread badge is a count of messages
//! from the other participant with no `read_at`, summed over all of the
//! user's conversations.

use chrono::Utc;
use tracing::{info, instrument};

use oficio_core::events::{DomainEvent, MessagesReadEvent};
use oficio_core::traits::RealtimeChannel;
use oficio_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Read tracker
pub struct ReadTracker<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReadTracker<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Acknowledge visibility of a conversation: marks everything unread
    /// from the other side as read. Returns how many messages were marked.
    #[instrument(skip(self))]
    pub async fn mark_conversation_read(
        &self,
        conversation_id: Snowflake,
        reader_id: Snowflake,
    ) -> ServiceResult<u64> {
        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))?;
        if !conversation.is_participant(reader_id) {
            return Err(DomainError::NotParticipant.into());
        }

        let now = Utc::now();
        let marked = self
            .ctx
            .message_repo()
            .mark_read(conversation_id, reader_id, now)
            .await?;

        if marked > 0 {
            info!(conversation_id = %conversation_id, marked, "Messages marked read");

            // Read receipts go to the conversation so the sender updates
            let event = DomainEvent::MessagesRead(MessagesReadEvent {
                conversation_id,
                reader_id,
                marked,
                timestamp: now,
            });
            self.ctx
                .publisher()
                .publish(RealtimeChannel::Conversation(conversation_id), &event)
                .await
                .ok();
        }

        Ok(marked)
    }

    /// The badge total across all of the user's conversations
    #[instrument(skip(self))]
    pub async fn unread_total(&self, user_id: Snowflake) -> ServiceResult<i64> {
        Ok(self.ctx.message_repo().count_unread_total(user_id).await?)
    }
}
