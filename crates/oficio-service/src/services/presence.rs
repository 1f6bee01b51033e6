//! Presence service - typing indicators
//!
//! Thin orchestration over the `TypingPresence` port: participant checks,
//! then refresh/stop on the store and a best-effort broadcast. The store
//! throttles refreshes, so only accepted refreshes are broadcast. Nothing
//! here may block or delay message delivery.

use chrono::Utc;
use tracing::instrument;

use oficio_core::events::{DomainEvent, TypingEvent};
use oficio_core::traits::{RealtimeChannel, TypingSnapshot};
use oficio_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Refresh the caller's typing indicator. Returns whether the refresh
    /// was accepted (throttled refreshes return false and broadcast nothing).
    #[instrument(skip(self, display_name))]
    pub async fn start_typing(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        display_name: &str,
    ) -> ServiceResult<bool> {
        self.check_participant(conversation_id, user_id).await?;

        let armed = self
            .ctx
            .typing()
            .refresh(conversation_id, user_id, display_name)
            .await?;
        if armed {
            let event = DomainEvent::TypingStarted(TypingEvent {
                conversation_id,
                user_id,
                display_name: display_name.to_string(),
                timestamp: Utc::now(),
            });
            self.ctx
                .publisher()
                .publish(RealtimeChannel::Conversation(conversation_id), &event)
                .await
                .ok();
        }

        Ok(armed)
    }

    /// Explicitly stop typing (input cleared or blurred)
    #[instrument(skip(self))]
    pub async fn stop_typing(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        self.check_participant(conversation_id, user_id).await?;

        let was_typing = self.ctx.typing().stop(conversation_id, user_id).await?;
        if was_typing {
            let event = DomainEvent::TypingStopped(TypingEvent {
                conversation_id,
                user_id,
                display_name: String::new(),
                timestamp: Utc::now(),
            });
            self.ctx
                .publisher()
                .publish(RealtimeChannel::Conversation(conversation_id), &event)
                .await
                .ok();
        }

        Ok(())
    }

    /// Who the viewer currently sees as typing (everyone but themselves)
    #[instrument(skip(self))]
    pub async fn typers(
        &self,
        conversation_id: Snowflake,
        viewer_id: Snowflake,
    ) -> ServiceResult<Vec<TypingSnapshot>> {
        self.check_participant(conversation_id, viewer_id).await?;

        let mut typers = self.ctx.typing().active(conversation_id).await?;
        typers.retain(|t| t.user_id != viewer_id);
        Ok(typers)
    }

    async fn check_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))?;
        if !conversation.is_participant(user_id) {
            return Err(DomainError::NotParticipant.into());
        }
        Ok(())
    }
}
