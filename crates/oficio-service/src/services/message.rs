//! Message service
//!
//! Sending (text, files, captioned files), history paging, soft deletion.

use chrono::Utc;
use tracing::{info, instrument, warn};

use oficio_core::entities::{Conversation, Message, MessageKind};
use oficio_core::events::{DomainEvent, MessageCreatedEvent, MessageDeletedEvent};
use oficio_core::traits::{MessagePage, RealtimeChannel};
use oficio_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Longest accepted message body
pub const MESSAGE_MAX_LEN: usize = 4000;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a text message
    #[instrument(skip(self, content))]
    pub async fn send_message(
        &self,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        content: String,
        reply_to_id: Option<Snowflake>,
    ) -> ServiceResult<Message> {
        let conversation = self.participant_conversation(conversation_id, sender_id).await?;

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ServiceError::validation("message content is empty"));
        }
        if content.len() > MESSAGE_MAX_LEN {
            return Err(DomainError::ContentTooLong {
                max: MESSAGE_MAX_LEN,
            }
            .into());
        }

        // Reply targets are weak references: a target in another thread is an
        // error, a target that no longer exists is merely logged.
        if let Some(reply_to) = reply_to_id {
            match self.ctx.message_repo().find_by_id(reply_to).await? {
                Some(target) if target.conversation_id != conversation_id => {
                    return Err(DomainError::ReplyOutsideConversation {
                        reply_to,
                        conversation: conversation_id,
                    }
                    .into());
                }
                Some(_) => {}
                None => warn!(reply_to = %reply_to, "Reply target not found"),
            }
        }

        let message = Message::new_text(
            self.ctx.generate_id(),
            conversation_id,
            sender_id,
            content,
            reply_to_id,
        );

        self.persist_and_publish(&conversation, message).await
    }

    /// Send an image or file message, optionally with a caption.
    ///
    /// The caption is a separate text message and is only sent once the file
    /// message has been persisted, so a failed upload never leaves an orphan
    /// caption behind.
    #[instrument(skip(self, caption))]
    pub async fn send_file_message(
        &self,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        kind: MessageKind,
        file_url: String,
        file_name: String,
        caption: Option<String>,
    ) -> ServiceResult<Vec<Message>> {
        if !kind.requires_file() {
            return Err(ServiceError::validation("kind must be image or file"));
        }
        if file_url.trim().is_empty() {
            return Err(ServiceError::validation("file_url is required"));
        }

        let conversation = self.participant_conversation(conversation_id, sender_id).await?;

        let file_message = Message::new_file(
            self.ctx.generate_id(),
            conversation_id,
            sender_id,
            kind,
            file_url,
            file_name,
        );
        let file_message = self.persist_and_publish(&conversation, file_message).await?;

        let mut sent = vec![file_message];

        if let Some(caption) = caption.filter(|c| !c.trim().is_empty()) {
            let caption_message = self
                .send_message(conversation_id, sender_id, caption, None)
                .await?;
            sent.push(caption_message);
        }

        Ok(sent)
    }

    /// Page through a conversation's history, honoring the viewer's clear
    /// watermark. Messages come back ascending.
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        conversation_id: Snowflake,
        viewer_id: Snowflake,
        page: MessagePage,
    ) -> ServiceResult<Vec<Message>> {
        self.participant_conversation(conversation_id, viewer_id).await?;

        let ascending = page.after.is_some();
        let mut messages = self
            .ctx
            .message_repo()
            .find_by_conversation(conversation_id, page)
            .await?;
        if !ascending {
            messages.reverse();
        }

        if let Some(watermark) = self
            .ctx
            .conversation_repo()
            .watermark(conversation_id, viewer_id)
            .await?
        {
            messages.retain(|m| m.created_at > watermark);
        }

        Ok(messages)
    }

    /// Soft-delete one of the caller's own messages
    #[instrument(skip(self))]
    pub async fn delete_message(
        &self,
        message_id: Snowflake,
        caller_id: Snowflake,
    ) -> ServiceResult<()> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", message_id.to_string()))?;

        if message.sender_id != caller_id {
            return Err(DomainError::SenderOnly.into());
        }

        self.ctx.message_repo().delete(message_id).await?;

        // Deleting the newest message moves the conversation's high-water mark
        let latest = self
            .ctx
            .message_repo()
            .latest_created_at(message.conversation_id)
            .await?;
        self.ctx
            .conversation_repo()
            .reset_last_message(message.conversation_id, latest)
            .await?;

        info!(message_id = %message_id, "Message deleted");

        let event = DomainEvent::MessageDeleted(MessageDeletedEvent {
            conversation_id: message.conversation_id,
            message_id,
            timestamp: Utc::now(),
        });
        self.ctx
            .publisher()
            .publish(RealtimeChannel::Conversation(message.conversation_id), &event)
            .await
            .ok();

        Ok(())
    }

    async fn participant_conversation(
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
            return Err(DomainError::NotParticipant.into());
        }

        Ok(conversation)
    }

    async fn persist_and_publish(
        &self,
        conversation: &Conversation,
        message: Message,
    ) -> ServiceResult<Message> {
        self.ctx.message_repo().create(&message).await?;
        self.ctx
            .conversation_repo()
            .touch_last_message(conversation.id, message.created_at)
            .await?;

        // Sending ends the sender's typing indicator
        self.ctx
            .typing()
            .stop(conversation.id, message.sender_id)
            .await
            .ok();

        info!(
            message_id = %message.id,
            conversation_id = %conversation.id,
            kind = message.kind.as_str(),
            "Message created"
        );

        let event = DomainEvent::MessageCreated(MessageCreatedEvent {
            conversation_id: conversation.id,
            message_id: message.id,
            sender_id: message.sender_id,
            timestamp: message.created_at,
        });
        self.ctx
            .publisher()
            .publish(RealtimeChannel::Conversation(conversation.id), &event)
            .await
            .ok();

        Ok(message)
    }
}
