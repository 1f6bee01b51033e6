//! Appointment scheduler
//!
//! Optional scheduled visit for an accepted quote. One visit per quote;
//! scheduling again replaces it.

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, instrument};

use oficio_core::entities::{Appointment, QuoteStatus};
use oficio_core::{DomainError, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Appointment service
pub struct AppointmentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AppointmentService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Professional schedules (or reschedules) the visit for an accepted quote
    #[instrument(skip(self, location))]
    pub async fn schedule_visit(
        &self,
        quote_id: Snowflake,
        professional_id: Snowflake,
        date: NaiveDate,
        time: NaiveTime,
        location: String,
    ) -> ServiceResult<Appointment> {
        let quote = self
            .ctx
            .quote_repo()
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote", quote_id.to_string()))?;

        if professional_id != quote.client_id && professional_id != quote.professional_id {
            return Err(DomainError::NotParticipant.into());
        }
        if professional_id != quote.professional_id {
            return Err(DomainError::ProfessionalOnly.into());
        }
        if quote.status != QuoteStatus::Accepted {
            return Err(DomainError::NotSchedulable(quote_id).into());
        }

        let location = location.trim().to_string();
        if location.is_empty() {
            return Err(ServiceError::validation("appointment location is empty"));
        }

        let appointment =
            Appointment::new(self.ctx.generate_id(), quote_id, date, time, location);
        self.ctx.appointment_repo().upsert(&appointment).await?;

        info!(
            quote_id = %quote_id,
            date = %date,
            time = %time,
            "Visit scheduled"
        );

        Ok(appointment)
    }

    /// The quote's scheduled visit, for either participant
    #[instrument(skip(self))]
    pub async fn get_for_quote(
        &self,
        quote_id: Snowflake,
        caller_id: Snowflake,
    ) -> ServiceResult<Option<Appointment>> {
        let quote = self
            .ctx
            .quote_repo()
            .find_by_id(quote_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote", quote_id.to_string()))?;
        if caller_id != quote.client_id && caller_id != quote.professional_id {
            return Err(DomainError::NotParticipant.into());
        }

        Ok(self.ctx.appointment_repo().find_by_quote(quote_id).await?)
    }
}
