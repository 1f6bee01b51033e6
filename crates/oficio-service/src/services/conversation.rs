//! Conversation service
//!
//! Lazy create-or-get threads, the conversation list with unread counts,
//! and the per-user "clear conversation" watermark.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, instrument};

use oficio_core::entities::Conversation;
use oficio_core::events::{ConversationClearedEvent, ConversationCreatedEvent, DomainEvent};
use oficio_core::traits::RealtimeChannel;
use oficio_core::Snowflake;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// A conversation plus the viewer's unread count, for the list screen
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub conversation: Conversation,
    pub unread: i64,
}

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create or get the thread for a {client, professional, service} key
    #[instrument(skip(self))]
    pub async fn open_conversation(
        &self,
        client_id: Snowflake,
        professional_id: Snowflake,
        service_id: Option<Snowflake>,
    ) -> ServiceResult<Conversation> {
        if client_id == professional_id {
            return Err(ServiceError::validation(
                "cannot open a conversation with yourself",
            ));
        }

        if let Some(existing) = self
            .ctx
            .conversation_repo()
            .find_by_key(client_id, professional_id, service_id)
            .await?
        {
            return Ok(existing);
        }

        let conversation = Conversation::new(
            self.ctx.generate_id(),
            client_id,
            professional_id,
            service_id,
        );

        if let Err(create_err) = self.ctx.conversation_repo().create(&conversation).await {
            // Lost a create-or-get race; the winner's row is the thread
            if let Some(existing) = self
                .ctx
                .conversation_repo()
                .find_by_key(client_id, professional_id, service_id)
                .await?
            {
                return Ok(existing);
            }
            return Err(create_err.into());
        }

        info!(
            conversation_id = %conversation.id,
            client_id = %client_id,
            professional_id = %professional_id,
            "Conversation created"
        );

        let event = DomainEvent::ConversationCreated(ConversationCreatedEvent {
            conversation_id: conversation.id,
            client_id,
            professional_id,
            timestamp: Utc::now(),
        });
        for user in [client_id, professional_id] {
            self.ctx
                .publisher()
                .publish(RealtimeChannel::User(user), &event)
                .await
                .ok();
        }

        Ok(conversation)
    }

    /// Fetch a conversation the caller takes part in
    #[instrument(skip(self))]
    pub async fn get_conversation(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Conversation> {
        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))?;

        if !conversation.is_participant(user_id) {
            return Err(oficio_core::DomainError::NotParticipant.into());
        }

        Ok(conversation)
    }

    /// The caller's conversation list, most recent first, with unread counts
    #[instrument(skip(self))]
    pub async fn list_conversations(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ConversationSummary>> {
        let conversations = self.ctx.conversation_repo().find_by_user(user_id).await?;
        let unread: HashMap<Snowflake, i64> = self
            .ctx
            .message_repo()
            .count_unread_by_conversation(user_id)
            .await?
            .into_iter()
            .collect();

        Ok(conversations
            .into_iter()
            .map(|conversation| {
                let count = unread.get(&conversation.id).copied().unwrap_or(0);
                ConversationSummary {
                    conversation,
                    unread: count,
                }
            })
            .collect())
    }

    /// Hide the conversation's history for the caller only
    #[instrument(skip(self))]
    pub async fn clear_conversation(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        let conversation = self.get_conversation(conversation_id, user_id).await?;

        let now = Utc::now();
        self.ctx
            .conversation_repo()
            .set_watermark(conversation.id, user_id, now)
            .await?;

        info!(conversation_id = %conversation_id, user_id = %user_id, "Conversation cleared");

        let event = DomainEvent::ConversationCleared(ConversationClearedEvent {
            conversation_id,
            user_id,
            timestamp: now,
        });
        self.ctx
            .publisher()
            .publish(RealtimeChannel::User(user_id), &event)
            .await
            .ok();

        Ok(())
    }
}
