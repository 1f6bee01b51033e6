//! PaymentSession entity <-> model mapper

use oficio_core::entities::{PaymentSession, PaymentStatus};
use oficio_core::error::DomainError;
use oficio_core::value_objects::{Price, Snowflake};

use crate::models::PaymentSessionModel;

use super::corrupt_row;

impl TryFrom<PaymentSessionModel> for PaymentSession {
    type Error = DomainError;

    fn try_from(model: PaymentSessionModel) -> Result<Self, Self::Error> {
        let status: PaymentStatus = model.status.parse().map_err(corrupt_row)?;
        let amount = Price::from_centavos(model.amount_centavos).map_err(corrupt_row)?;
        Ok(PaymentSession {
            pix_id: model.pix_id,
            quote_id: Snowflake::new(model.quote_id),
            br_code: model.br_code,
            br_code_base64: model.br_code_base64,
            amount,
            status,
            expires_at: model.expires_at,
            created_at: model.created_at,
        })
    }
}
