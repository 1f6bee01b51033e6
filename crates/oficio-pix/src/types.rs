//! Wire types for the gateway's REST surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use oficio_core::entities::PaymentStatus;

/// Body of `POST /v1/charges`
#[derive(Debug, Clone, Serialize)]
pub struct CreateChargeRequest<'a> {
    /// Amount in centavos
    pub amount: i64,
    /// Caller-side reference (the quote id)
    pub reference: &'a str,
}

/// Response of `POST /v1/charges`
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeResponse {
    pub pix_id: String,
    pub br_code: String,
    pub br_code_base64: String,
    pub expires_at: DateTime<Utc>,
}

/// Response of `GET /v1/charges/{pix_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: PaymentStatus,
}
