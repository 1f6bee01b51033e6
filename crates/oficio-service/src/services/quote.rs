//! Quote service - the approval state machine
//!
//! Every transition follows the same shape: check the caller's role, check
//! the transition against the declared graph, then write through a
//! conditional repository update. A failed conditional write is re-read to
//! distinguish "quote vanished" from "a concurrent caller won"; either way
//! nothing was mutated here.

use chrono::Utc;
use tracing::{info, instrument};

use oficio_core::entities::{ParticipantRole, Quote, QuoteDecision, QuoteStatus};
use oficio_core::events::{DomainEvent, QuoteCreatedEvent, QuoteUpdatedEvent};
use oficio_core::traits::RealtimeChannel;
use oficio_core::value_objects::Price;
use oficio_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::payment::{PaymentCoordinator, PaymentInitiation};

/// Longest accepted quote title
pub const TITLE_MAX_LEN: usize = 160;

/// Quote service
pub struct QuoteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> QuoteService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Professional sends a price proposal into the conversation
    #[instrument(skip(self, title))]
    pub async fn create_quote(
        &self,
        conversation_id: Snowflake,
        professional_id: Snowflake,
        title: String,
        price: Price,
    ) -> ServiceResult<Quote> {
        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))?;

        match conversation.role_of(professional_id) {
            Some(ParticipantRole::Professional) => {}
            Some(ParticipantRole::Client) => return Err(DomainError::ProfessionalOnly.into()),
            None => return Err(DomainError::NotParticipant.into()),
        }

        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::validation("quote title is empty"));
        }
        if title.len() > TITLE_MAX_LEN {
            return Err(DomainError::ContentTooLong { max: TITLE_MAX_LEN }.into());
        }

        let quote = Quote::new(
            self.ctx.generate_id(),
            conversation_id,
            conversation.professional_id,
            conversation.client_id,
            title,
            price,
        );
        self.ctx.quote_repo().create(&quote).await?;

        info!(
            quote_id = %quote.id,
            conversation_id = %conversation_id,
            price = %quote.price,
            "Quote created"
        );

        let event = DomainEvent::QuoteCreated(QuoteCreatedEvent {
            conversation_id,
            quote_id: quote.id,
            professional_id: quote.professional_id,
            timestamp: quote.created_at,
        });
        self.ctx
            .publisher()
            .publish(RealtimeChannel::Conversation(conversation_id), &event)
            .await
            .ok();

        Ok(quote)
    }

    /// Client accepts or rejects a pending quote
    #[instrument(skip(self, response_text))]
    pub async fn respond_to_quote(
        &self,
        quote_id: Snowflake,
        client_id: Snowflake,
        decision: QuoteDecision,
        response_text: Option<String>,
    ) -> ServiceResult<Quote> {
        let quote = self.quote_for_participant(quote_id, client_id).await?;
        if quote.client_id != client_id {
            return Err(DomainError::ClientOnly.into());
        }

        let next = decision.as_status();
        let updated = self
            .ctx
            .quote_repo()
            .transition_status(quote_id, QuoteStatus::Pending, next, response_text.as_deref())
            .await?;
        if !updated {
            return Err(self.transition_failure(quote_id, next).await);
        }

        info!(quote_id = %quote_id, status = %next, "Quote answered");
        self.publish_status(quote.conversation_id, quote_id, next, false).await;

        self.reload(quote_id).await
    }

    /// Either party withdraws a pending or accepted quote
    #[instrument(skip(self))]
    pub async fn cancel_quote(&self, quote_id: Snowflake, caller_id: Snowflake) -> ServiceResult<Quote> {
        let quote = self.quote_for_participant(quote_id, caller_id).await?;

        if !quote.can_cancel() {
            return Err(DomainError::InvalidTransition {
                id: quote_id,
                current: quote.status,
                requested: QuoteStatus::Cancelled,
            }
            .into());
        }

        let updated = self
            .ctx
            .quote_repo()
            .transition_status(quote_id, quote.status, QuoteStatus::Cancelled, None)
            .await?;
        if !updated {
            return Err(self.transition_failure(quote_id, QuoteStatus::Cancelled).await);
        }

        info!(quote_id = %quote_id, "Quote cancelled");
        self.publish_status(quote.conversation_id, quote_id, QuoteStatus::Cancelled, false)
            .await;

        self.reload(quote_id).await
    }

    /// Professional marks the accepted service as done; status stays
    /// `accepted`, the quote is now awaiting the client's confirmation
    #[instrument(skip(self))]
    pub async fn complete_service(
        &self,
        quote_id: Snowflake,
        professional_id: Snowflake,
    ) -> ServiceResult<Quote> {
        let quote = self.quote_for_participant(quote_id, professional_id).await?;
        if quote.professional_id != professional_id {
            return Err(DomainError::ProfessionalOnly.into());
        }

        if !quote.can_complete() {
            return Err(DomainError::NotCompletable(quote_id).into());
        }

        let updated = self.ctx.quote_repo().mark_completed(quote_id, Utc::now()).await?;
        if !updated {
            // Lost a race with cancel or a duplicate completion
            return Err(match self.ctx.quote_repo().find_by_id(quote_id).await? {
                None => ServiceError::not_found("Quote", quote_id.to_string()),
                Some(_) => DomainError::NotCompletable(quote_id).into(),
            });
        }

        info!(quote_id = %quote_id, "Service marked complete, awaiting confirmation");
        self.publish_status(quote.conversation_id, quote_id, QuoteStatus::Accepted, true)
            .await;

        self.reload(quote_id).await
    }

    /// Client confirms the completed service. Confirmation is payment-gated:
    /// this starts (or resumes) the payment flow instead of flipping
    /// `client_confirmed` directly.
    #[instrument(skip(self))]
    pub async fn confirm_completion(
        &self,
        quote_id: Snowflake,
        client_id: Snowflake,
    ) -> ServiceResult<PaymentInitiation> {
        PaymentCoordinator::new(self.ctx)
            .initiate_payment(quote_id, client_id)
            .await
    }

    /// Fetch a quote the caller takes part in
    #[instrument(skip(self))]
    pub async fn get_quote(&self, quote_id: Snowflake, caller_id: Snowflake) -> ServiceResult<Quote> {
        self.quote_for_participant(quote_id, caller_id).await
    }

    /// All quotes of a conversation, for a participant
    #[instrument(skip(self))]
    pub async fn list_quotes(
        &self,
        conversation_id: Snowflake,
        caller_id: Snowflake,
    ) -> ServiceResult<Vec<Quote>> {
        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))?;
        if !conversation.is_participant(caller_id) {
            return Err(DomainError::NotParticipant.into());
        }

        Ok(self.ctx.quote_repo().find_by_conversation(conversation_id).await?)
    }

    /// Background sweep: pending quotes past their TTL move to `expired`.
    /// Returns how many expired.
    #[instrument(skip(self))]
    pub async fn expire_stale_quotes(&self) -> ServiceResult<usize> {
        let cutoff = Utc::now() - self.ctx.settings().quote_pending_ttl;
        let stale = self.ctx.quote_repo().find_stale_pending(cutoff).await?;

        let mut expired = 0;
        for quote in stale {
            let updated = self
                .ctx
                .quote_repo()
                .transition_status(quote.id, QuoteStatus::Pending, QuoteStatus::Expired, None)
                .await?;
            if updated {
                expired += 1;
                self.publish_status(quote.conversation_id, quote.id, QuoteStatus::Expired, false)
                    .await;
            }
        }

        if expired > 0 {
            info!(expired, "Stale pending quotes expired");
        }

        Ok(expired)
    }

    async fn quote_for_participant(
        &self,
        quote_id: Snowflake,
        caller_id: Snowflake,
    ) -> ServiceResult<Quote> {
        let quote = self
            .ctx
            .quote_repo()
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote", quote_id.to_string()))?;

        if caller_id != quote.client_id && caller_id != quote.professional_id {
            return Err(DomainError::NotParticipant.into());
        }

        Ok(quote)
    }

    /// Map a failed conditional write to the right error by re-reading
    async fn transition_failure(&self, quote_id: Snowflake, requested: QuoteStatus) -> ServiceError {
        match self.ctx.quote_repo().find_by_id(quote_id).await {
            Ok(Some(current)) => DomainError::InvalidTransition {
                id: quote_id,
                current: current.status,
                requested,
            }
            .into(),
            Ok(None) => ServiceError::not_found("Quote", quote_id.to_string()),
            Err(e) => e.into(),
        }
    }

    async fn reload(&self, quote_id: Snowflake) -> ServiceResult<Quote> {
        self.ctx
            .quote_repo()
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote", quote_id.to_string()))
    }

    async fn publish_status(
        &self,
        conversation_id: Snowflake,
        quote_id: Snowflake,
        status: QuoteStatus,
        completed: bool,
    ) {
        let event = DomainEvent::QuoteUpdated(QuoteUpdatedEvent {
            conversation_id,
            quote_id,
            status,
            completed,
            timestamp: Utc::now(),
        });
        self.ctx
            .publisher()
            .publish(RealtimeChannel::Conversation(conversation_id), &event)
            .await
            .ok();
    }
}
