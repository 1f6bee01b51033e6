//! Quote entity <-> model mapper

use oficio_core::entities::{Quote, QuoteStatus};
use oficio_core::error::DomainError;
use oficio_core::value_objects::{Price, Snowflake};

use crate::models::QuoteModel;

/// A row that violates entity invariants (unknown enum text, non-positive
/// money) can only come from outside the application; report it as a
/// database error.
pub fn corrupt_row(detail: impl std::fmt::Display) -> DomainError {
    DomainError::DatabaseError(format!("corrupt row: {detail}"))
}

impl TryFrom<QuoteModel> for Quote {
    type Error = DomainError;

    fn try_from(model: QuoteModel) -> Result<Self, Self::Error> {
        let status: QuoteStatus = model.status.parse().map_err(corrupt_row)?;
        let price = Price::from_centavos(model.price_centavos).map_err(corrupt_row)?;
        Ok(Quote {
            id: Snowflake::new(model.id),
            conversation_id: Snowflake::new(model.conversation_id),
            professional_id: Snowflake::new(model.professional_id),
            client_id: Snowflake::new(model.client_id),
            title: model.title,
            price,
            status,
            response_text: model.response_text,
            completed_at: model.completed_at,
            client_confirmed: model.client_confirmed,
            pix_id: model.pix_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
