//! Payment coordinator
//!
//! Drives a completed quote to its confirmed terminal state through the
//! external PIX gateway:
//!
//! - initiation is identity-gated and resumable: without a document on file
//!   the caller gets [`PaymentInitiation::IdentityRequired`] back, collects
//!   the document, and calls again;
//! - initiation is idempotent: a live (pending, unexpired) session is
//!   returned as-is, never recharged;
//! - while a payment view is open, a watcher task polls the gateway at a
//!   fixed interval. It stops itself the moment the quote is terminal or the
//!   session dies, and the handle aborts it when the view closes;
//! - a PAID observation settles the session and flips `client_confirmed`
//!   through a conditional write keyed on the quote's pre-confirmation state
//!   and the matching `pix_id`;
//! - a reconciliation sweep re-queries sessions whose watcher died before
//!   the PAID observation landed.

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use oficio_core::entities::{PaymentSession, PaymentStatus, Quote};
use oficio_core::events::{DomainEvent, PaymentSessionCreatedEvent, QuoteConfirmedEvent};
use oficio_core::traits::RealtimeChannel;
use oficio_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Outcome of a payment initiation attempt
#[derive(Debug, Clone)]
pub enum PaymentInitiation {
    /// The payer has no identity document on file; collect one and call
    /// again - this is a pause, not a failure
    IdentityRequired,
    /// A charge is live; render the QR code and open the payment view
    Ready(PaymentSession),
}

/// Handle for a running status watcher. The watcher also stops on its own
/// when the quote reaches a terminal state; the handle exists so closing the
/// payment view can cut it short.
pub struct PaymentWatch {
    ctx: ServiceContext,
    quote_id: Snowflake,
}

impl PaymentWatch {
    pub fn quote_id(&self) -> Snowflake {
        self.quote_id
    }

    pub fn is_active(&self) -> bool {
        self.ctx.watchers().contains_key(&self.quote_id)
    }

    /// Stop polling (payment view closed)
    pub fn stop(&self) {
        if let Some((_, handle)) = self.ctx.watchers().remove(&self.quote_id) {
            handle.abort();
            debug!(quote_id = %self.quote_id, "Payment watcher stopped");
        }
    }
}

/// Payment coordinator
pub struct PaymentCoordinator<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PaymentCoordinator<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start (or resume) the payment flow for a completed quote.
    ///
    /// Calling this again while a session is live returns the same charge;
    /// no duplicate is ever created.
    #[instrument(skip(self))]
    pub async fn initiate_payment(
        &self,
        quote_id: Snowflake,
        client_id: Snowflake,
    ) -> ServiceResult<PaymentInitiation> {
        let quote = self
            .ctx
            .quote_repo()
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote", quote_id.to_string()))?;

        if client_id != quote.client_id && client_id != quote.professional_id {
            return Err(DomainError::NotParticipant.into());
        }
        if client_id != quote.client_id {
            return Err(DomainError::ClientOnly.into());
        }
        if !quote.is_awaiting_confirmation() {
            return Err(DomainError::NotConfirmable(quote_id).into());
        }

        // Resumable two-step: pause here until the document is collected
        if !self.ctx.identity_gate().has_on_file_identity(client_id).await? {
            info!(quote_id = %quote_id, "Payment paused, identity document required");
            return Ok(PaymentInitiation::IdentityRequired);
        }

        let now = Utc::now();

        // Idempotence: reuse the live session instead of recharging
        if let Some(session) = self
            .ctx
            .session_repo()
            .find_live_by_quote(quote_id, now)
            .await?
        {
            debug!(quote_id = %quote_id, pix_id = %session.pix_id, "Reusing live payment session");
            self.start_status_watcher(quote_id);
            return Ok(PaymentInitiation::Ready(session));
        }

        let charge = self
            .ctx
            .payment_gateway()
            .create_charge(quote.price, &quote_id.to_string())
            .await?;

        let session = PaymentSession {
            pix_id: charge.pix_id.clone(),
            quote_id,
            br_code: charge.br_code,
            br_code_base64: charge.br_code_base64,
            amount: quote.price,
            status: PaymentStatus::Pending,
            expires_at: charge.expires_at,
            created_at: now,
        };
        self.ctx.session_repo().create(&session).await?;

        let attached = self.ctx.quote_repo().attach_pix(quote_id, &charge.pix_id).await?;
        if !attached {
            // The quote left its awaiting-confirmation state mid-flight;
            // abandon the fresh session and report the lost race.
            self.ctx
                .session_repo()
                .settle(&charge.pix_id, PaymentStatus::Expired)
                .await
                .ok();
            return Err(DomainError::ConcurrentUpdate(quote_id).into());
        }

        info!(
            quote_id = %quote_id,
            pix_id = %session.pix_id,
            amount = %session.amount,
            "Payment session created"
        );

        let event = DomainEvent::PaymentSessionCreated(PaymentSessionCreatedEvent {
            conversation_id: quote.conversation_id,
            quote_id,
            pix_id: session.pix_id.clone(),
            expires_at: session.expires_at,
            timestamp: now,
        });
        self.ctx
            .publisher()
            .publish(RealtimeChannel::User(quote.client_id), &event)
            .await
            .ok();

        self.start_status_watcher(quote_id);

        Ok(PaymentInitiation::Ready(session))
    }

    /// Collect the payer's identity document, unblocking initiation
    #[instrument(skip(self, document))]
    pub async fn submit_identity(&self, user_id: Snowflake, document: &str) -> ServiceResult<()> {
        self.ctx.identity_gate().collect_identity(user_id, document).await?;
        Ok(())
    }

    /// Current session for a quote's payment view
    #[instrument(skip(self))]
    pub async fn payment_status(
        &self,
        quote_id: Snowflake,
        caller_id: Snowflake,
    ) -> ServiceResult<PaymentSession> {
        let quote = self
            .ctx
            .quote_repo()
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote", quote_id.to_string()))?;
        if caller_id != quote.client_id && caller_id != quote.professional_id {
            return Err(DomainError::NotParticipant.into());
        }

        let pix_id = quote
            .pix_id
            .as_deref()
            .ok_or_else(|| ServiceError::not_found("PaymentSession", quote_id.to_string()))?;

        self.ctx
            .session_repo()
            .find_by_pix_id(pix_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("PaymentSession", pix_id.to_string()))
    }

    /// Close the payment view: stop the quote's watcher if one is running
    #[instrument(skip(self))]
    pub fn close_payment_view(&self, quote_id: Snowflake) {
        if let Some((_, handle)) = self.ctx.watchers().remove(&quote_id) {
            handle.abort();
            debug!(quote_id = %quote_id, "Payment watcher stopped on view close");
        }
    }

    /// Spawn the polling watcher for a quote, replacing any previous one.
    /// One watcher per quote; the task unregisters itself when it stops.
    pub fn start_status_watcher(&self, quote_id: Snowflake) -> PaymentWatch {
        if let Some((_, previous)) = self.ctx.watchers().remove(&quote_id) {
            previous.abort();
        }

        let task_ctx = self.ctx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(task_ctx.settings().payment_poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval fires immediately; skip the zeroth tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match Self::poll_quote(&task_ctx, quote_id).await {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => {
                        // Transient gateway trouble: stay silent, retry next tick
                        warn!(quote_id = %quote_id, error = %e, "Payment poll failed, will retry");
                    }
                }
            }

            task_ctx.watchers().remove(&quote_id);
        });

        self.ctx.watchers().insert(quote_id, handle.abort_handle());

        PaymentWatch {
            ctx: self.ctx.clone(),
            quote_id,
        }
    }

    /// One poll step. Returns `true` when there is nothing left to watch.
    #[instrument(skip(self))]
    pub async fn poll_once(&self, quote_id: Snowflake) -> ServiceResult<bool> {
        Self::poll_quote(self.ctx, quote_id).await
    }

    async fn poll_quote(ctx: &ServiceContext, quote_id: Snowflake) -> ServiceResult<bool> {
        let Some(quote) = ctx.quote_repo().find_by_id(quote_id).await? else {
            return Ok(true);
        };
        if quote.is_terminal() {
            return Ok(true);
        }
        let Some(pix_id) = quote.pix_id.clone() else {
            return Ok(true);
        };
        let Some(session) = ctx.session_repo().find_by_pix_id(&pix_id).await? else {
            return Ok(true);
        };
        if session.status != PaymentStatus::Pending {
            return Ok(true);
        }

        // The local countdown may beat the next poll to the deadline; the
        // quote stays untouched either way and the client may re-initiate.
        if session.is_expired_at(Utc::now()) {
            ctx.session_repo().settle(&pix_id, PaymentStatus::Expired).await?;
            info!(quote_id = %quote_id, pix_id = %pix_id, "Payment session expired locally");
            return Ok(true);
        }

        match ctx.payment_gateway().get_status(&pix_id).await? {
            PaymentStatus::Pending => Ok(false),
            PaymentStatus::Paid => {
                Self::apply_paid(ctx, &quote, &pix_id).await?;
                Ok(true)
            }
            PaymentStatus::Expired => {
                ctx.session_repo().settle(&pix_id, PaymentStatus::Expired).await?;
                info!(quote_id = %quote_id, pix_id = %pix_id, "Payment session expired at gateway");
                Ok(true)
            }
        }
    }

    /// Background sweep for sessions whose watcher died before PAID was
    /// observed. Safe next to a live watcher: confirmation is conditional,
    /// so double observation collapses to one write.
    #[instrument(skip(self))]
    pub async fn reconcile_pending(&self) -> ServiceResult<usize> {
        let cutoff = Utc::now() - self.ctx.settings().payment_reconcile_grace;
        let stale = self.ctx.session_repo().find_stale_pending(cutoff).await?;

        let mut confirmed = 0;
        for session in stale {
            match Self::poll_quote(self.ctx, session.quote_id).await {
                Ok(_) => {
                    if let Some(quote) =
                        self.ctx.quote_repo().find_by_id(session.quote_id).await?
                    {
                        if quote.client_confirmed {
                            confirmed += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        pix_id = %session.pix_id,
                        error = %e,
                        "Reconciliation poll failed, will retry next sweep"
                    );
                }
            }
        }

        if confirmed > 0 {
            info!(confirmed, "Reconciliation confirmed missed payments");
        }

        Ok(confirmed)
    }

    async fn apply_paid(ctx: &ServiceContext, quote: &Quote, pix_id: &str) -> ServiceResult<()> {
        ctx.session_repo().settle(pix_id, PaymentStatus::Paid).await?;

        let confirmed = ctx.quote_repo().confirm_paid(quote.id, pix_id).await?;
        if !confirmed {
            // Already confirmed by another observer, or the quote left its
            // awaiting-confirmation state; either way nothing to do.
            debug!(quote_id = %quote.id, "PAID observed but confirmation not applied");
            return Ok(());
        }

        info!(quote_id = %quote.id, pix_id = %pix_id, "Payment confirmed, quote reached terminal state");

        let event = DomainEvent::QuoteConfirmed(QuoteConfirmedEvent {
            conversation_id: quote.conversation_id,
            quote_id: quote.id,
            pix_id: pix_id.to_string(),
            timestamp: Utc::now(),
        });
        ctx.publisher()
            .publish(RealtimeChannel::Conversation(quote.conversation_id), &event)
            .await
            .ok();
        // The professional side gets a direct notification as well
        ctx.publisher()
            .publish(RealtimeChannel::User(quote.professional_id), &event)
            .await
            .ok();

        Ok(())
    }
}
